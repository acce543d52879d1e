//! Cartesian-product sweep over sampling parameters.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::model::SamplingConfig;

/// Value lists for each sampling dimension.
///
/// Enumeration is nested in declaration order: `temperature` is the outermost
/// loop and `presence_penalty` the innermost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    #[serde(default = "default_temperature")]
    pub temperature: Vec<f64>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Vec<u32>,
    #[serde(default = "default_top_p")]
    pub top_p: Vec<f64>,
    #[serde(default = "default_best_of")]
    pub best_of: Vec<u32>,
    #[serde(default = "default_penalty")]
    pub frequency_penalty: Vec<f64>,
    #[serde(default = "default_penalty")]
    pub presence_penalty: Vec<f64>,
}

fn default_temperature() -> Vec<f64> {
    vec![0.0, 0.5, 1.0]
}
fn default_max_tokens() -> Vec<u32> {
    vec![16]
}
fn default_top_p() -> Vec<f64> {
    vec![1.0, 0.75]
}
fn default_best_of() -> Vec<u32> {
    vec![1, 2, 4]
}
fn default_penalty() -> Vec<f64> {
    vec![0.0]
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            best_of: default_best_of(),
            frequency_penalty: default_penalty(),
            presence_penalty: default_penalty(),
        }
    }
}

const DIMENSIONS: usize = 6;

impl ParameterGrid {
    /// A grid with exactly one value per dimension.
    pub fn single(config: SamplingConfig) -> Self {
        Self {
            temperature: vec![config.temperature],
            max_tokens: vec![config.max_tokens],
            top_p: vec![config.top_p],
            best_of: vec![config.best_of],
            frequency_penalty: vec![config.frequency_penalty],
            presence_penalty: vec![config.presence_penalty],
        }
    }

    fn sizes(&self) -> [usize; DIMENSIONS] {
        [
            self.temperature.len(),
            self.max_tokens.len(),
            self.top_p.len(),
            self.best_of.len(),
            self.frequency_penalty.len(),
            self.presence_penalty.len(),
        ]
    }

    /// Number of configurations the grid enumerates.
    pub fn len(&self) -> usize {
        self.sizes().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate every configuration. Each call starts a fresh pass.
    pub fn iter(&self) -> SweepIter<'_> {
        SweepIter {
            grid: self,
            indices: [0; DIMENSIONS],
            remaining: self.len(),
        }
    }

    /// Reject empty dimensions and repeated values within a dimension.
    pub fn validate(&self) -> Result<()> {
        check_dimension("temperature", &self.temperature)?;
        check_dimension("max_tokens", &self.max_tokens)?;
        check_dimension("top_p", &self.top_p)?;
        check_dimension("best_of", &self.best_of)?;
        check_dimension("frequency_penalty", &self.frequency_penalty)?;
        check_dimension("presence_penalty", &self.presence_penalty)?;
        Ok(())
    }
}

fn check_dimension<T: PartialEq + std::fmt::Debug>(name: &str, values: &[T]) -> Result<()> {
    anyhow::ensure!(!values.is_empty(), "sweep dimension '{name}' has no values");
    for (i, value) in values.iter().enumerate() {
        anyhow::ensure!(
            !values[..i].contains(value),
            "sweep dimension '{name}' repeats value {value:?}"
        );
    }
    Ok(())
}

impl<'a> IntoIterator for &'a ParameterGrid {
    type Item = SamplingConfig;
    type IntoIter = SweepIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy odometer over a [`ParameterGrid`].
#[derive(Debug, Clone)]
pub struct SweepIter<'a> {
    grid: &'a ParameterGrid,
    indices: [usize; DIMENSIONS],
    remaining: usize,
}

impl Iterator for SweepIter<'_> {
    type Item = SamplingConfig;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let [t, m, p, b, f, pr] = self.indices;
        let config = SamplingConfig {
            temperature: self.grid.temperature[t],
            max_tokens: self.grid.max_tokens[m],
            top_p: self.grid.top_p[p],
            best_of: self.grid.best_of[b],
            frequency_penalty: self.grid.frequency_penalty[f],
            presence_penalty: self.grid.presence_penalty[pr],
        };

        // Advance the innermost dimension, carrying outward.
        let sizes = self.grid.sizes();
        for dim in (0..DIMENSIONS).rev() {
            self.indices[dim] += 1;
            if self.indices[dim] < sizes[dim] {
                break;
            }
            self.indices[dim] = 0;
        }
        self.remaining -= 1;

        Some(config)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SweepIter<'_> {}
