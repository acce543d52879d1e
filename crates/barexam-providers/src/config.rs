//! Configuration loading and provider factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use barexam_core::retry::RetryPolicy;
use barexam_core::session::RunnerConfig;
use barexam_core::sweep::ParameterGrid;
use barexam_core::traits::CompletionProvider;

use crate::mock::MockProvider;
use crate::openai::OpenAiProvider;

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "barexam.toml";

/// Which completion service to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        /// File holding the API key; relative to the config file.
        #[serde(default = "default_api_key_file")]
        api_key_file: PathBuf,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    /// Offline stand-in that answers every prompt with `response`.
    Mock {
        #[serde(default = "default_mock_response")]
        response: String,
    },
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::OpenAI {
            api_key_file: default_api_key_file(),
            base_url: None,
            org_id: None,
        }
    }
}

fn default_api_key_file() -> PathBuf {
    PathBuf::from(".openai_key")
}
fn default_mock_response() -> String {
    "First Choice: A\nSecond Choice: B\nThird Choice: C".to_string()
}

/// Top-level barexam configuration (`barexam.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarExamConfig {
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sessions recorded per sweep point.
    #[serde(default = "default_samples")]
    pub samples_per_config: u32,
    /// Retries after a failed submission.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Pause before each retry, in seconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_questions_path")]
    pub questions_path: PathBuf,
    #[serde(default = "default_answer_key_path")]
    pub answer_key_path: PathBuf,
    /// Root holding the `bar-exam-NNN` session directories.
    #[serde(default = "default_sessions_dir")]
    pub sessions_dir: PathBuf,
    /// Where `barexam score` writes its CSV.
    #[serde(default = "default_summary_path")]
    pub summary_path: PathBuf,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub sweep: ParameterGrid,
}

fn default_model() -> String {
    "text-davinci-003".to_string()
}
fn default_samples() -> u32 {
    3
}
fn default_retries() -> u32 {
    1
}
fn default_retry_delay() -> u64 {
    10
}
fn default_questions_path() -> PathBuf {
    PathBuf::from("data/questions.csv")
}
fn default_answer_key_path() -> PathBuf {
    PathBuf::from("data/answer_key_category.csv")
}
fn default_sessions_dir() -> PathBuf {
    PathBuf::from("sessions")
}
fn default_summary_path() -> PathBuf {
    PathBuf::from("all_exam_summary.csv")
}

impl Default for BarExamConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            samples_per_config: default_samples(),
            max_retries: default_retries(),
            retry_delay_secs: default_retry_delay(),
            questions_path: default_questions_path(),
            answer_key_path: default_answer_key_path(),
            sessions_dir: default_sessions_dir(),
            summary_path: default_summary_path(),
            provider: ProviderConfig::default(),
            sweep: ParameterGrid::default(),
        }
    }
}

impl BarExamConfig {
    /// Check values the runner cannot work with.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.model.trim().is_empty(), "model must not be empty");
        anyhow::ensure!(
            self.samples_per_config >= 1,
            "samples_per_config must be at least 1"
        );
        self.sweep.validate()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delay: Duration::from_secs(self.retry_delay_secs),
        }
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            model: self.model.clone(),
            samples_per_config: self.samples_per_config,
            retry: self.retry_policy(),
        }
    }

    /// Make every relative path relative to `base` instead of the cwd.
    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.questions_path);
        resolve(&mut self.answer_key_path);
        resolve(&mut self.sessions_dir);
        resolve(&mut self.summary_path);
        if let ProviderConfig::OpenAI { api_key_file, .. } = &mut self.provider {
            resolve(api_key_file);
        }
    }
}

/// Load config from an explicit path, or `barexam.toml` in the current
/// directory, or defaults if that is absent too.
///
/// An explicit path must exist.
pub fn load_config_from(path: Option<&Path>) -> Result<BarExamConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.exists().then_some(local)
        }
    };

    let Some(config_path) = config_path else {
        tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
        return Ok(BarExamConfig::default());
    };

    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read config: {}", config_path.display()))?;
    let mut config = toml::from_str::<BarExamConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", config_path.display()))?;

    if let Some(base) = config_path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}

/// Read an API key from a credential file, trimming surrounding whitespace.
pub fn read_api_key(path: &Path) -> Result<String> {
    let key = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read API key file: {}", path.display()))?;
    let key = key.trim().to_string();
    anyhow::ensure!(!key.is_empty(), "API key file is empty: {}", path.display());
    Ok(key)
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn CompletionProvider>> {
    match config {
        ProviderConfig::OpenAI {
            api_key_file,
            base_url,
            org_id,
        } => {
            let api_key = read_api_key(api_key_file)?;
            Ok(Box::new(OpenAiProvider::new(
                &api_key,
                base_url.clone(),
                org_id.clone(),
            )?))
        }
        ProviderConfig::Mock { response } => Ok(Box::new(MockProvider::with_fixed_response(response))),
    }
}
