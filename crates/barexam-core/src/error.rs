//! Error types shared across the pipeline.
//!
//! `ProviderError` lives here rather than in `barexam-providers` so the
//! session runner can report submission failures without depending on a
//! concrete client.

use thiserror::Error;

/// Errors that can occur when talking to a completion service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Fatal data-integrity errors raised while scoring.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    /// No answer key row exists for the question.
    #[error("answer key match is not found for category={category}, number={number}")]
    NoMatch { category: String, number: i64 },

    /// More than one answer key row exists for the question.
    #[error(
        "answer key match is not unique for category={category}, number={number} ({count} rows)"
    )]
    NonUniqueMatch {
        category: String,
        number: i64,
        count: usize,
    },

    /// The matching answer key row does not hold a letter A-D.
    #[error("answer key entry for category={category}, number={number} is not a choice: {answer:?}")]
    InvalidAnswer {
        category: String,
        number: i64,
        answer: String,
    },
}
