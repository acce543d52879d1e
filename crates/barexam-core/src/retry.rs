//! Bounded fixed-delay retry for service submissions.

use std::future::Future;
use std::time::Duration;

/// Outcome of a submission after retries are exhausted.
#[derive(Debug)]
pub enum Submission<T> {
    Success(T),
    Failure {
        /// Rendered error chain of the last attempt.
        reason: String,
        /// Total attempts made, including the first.
        attempts: u32,
    },
}

impl<T> Submission<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Submission::Success(_))
    }

    /// The successful value, discarding failure details.
    pub fn ok(self) -> Option<T> {
        match self {
            Submission::Success(value) => Some(value),
            Submission::Failure { .. } => None,
        }
    }
}

/// How many times to retry a failed submission and how long to wait first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Fixed pause before each retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds or `max_retries` retries have failed.
    ///
    /// `on_error` sees every failed attempt (1-based) before any pause.
    pub async fn run<T, F, Fut>(
        &self,
        mut op: F,
        mut on_error: impl FnMut(u32, &anyhow::Error),
    ) -> Submission<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let total = self.max_retries + 1;
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Submission::Success(value),
                Err(e) => {
                    on_error(attempt, &e);
                    if attempt >= total {
                        return Submission::Failure {
                            reason: format!("{e:#}"),
                            attempts: attempt,
                        };
                    }
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
