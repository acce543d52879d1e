//! Completion service trait definitions.
//!
//! Implemented by the clients in `barexam-providers`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::SamplingConfig;

/// Trait for text-completion backends.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Submit one prompt and return the service's response.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse>;
}

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "text-davinci-003").
    pub model: String,
    /// The prompt text.
    pub prompt: String,
    /// Sampling parameters for this request.
    pub sampling: SamplingConfig,
}

/// A completion response.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Candidate completions, in service order.
    pub choices: Vec<CompletionChoice>,
    /// The response body exactly as returned, persisted in the session record.
    pub raw: serde_json::Value,
}

impl CompletionResponse {
    /// Text of the first candidate, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.text.as_str())
    }
}

/// One candidate completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
}

/// The part of a recorded response body the scorer reads.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionBody {
    pub choices: Vec<CompletionChoice>,
}

impl CompletionBody {
    /// Interpret a recorded `model_response` value.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}
