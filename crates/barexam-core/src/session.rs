//! Session runner: drives the question source through the completion service
//! for every point of the parameter sweep.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::data::QuestionSource;
use crate::model::{QuestionAttempt, SamplingConfig, SessionRecord};
use crate::prompt::build_prompt;
use crate::retry::{RetryPolicy, Submission};
use crate::store::{SessionDir, SessionStore};
use crate::sweep::ParameterGrid;
use crate::traits::{CompletionProvider, CompletionRequest};

/// Configuration for the session runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Model identifier sent with every request.
    pub model: String,
    /// Sessions to record per sampling config.
    pub samples_per_config: u32,
    /// Retry policy for each question's submission.
    pub retry: RetryPolicy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            model: "text-davinci-003".to_string(),
            samples_per_config: 3,
            retry: RetryPolicy::default(),
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_session_start(&self, session: &str, params: &SamplingConfig, questions: usize);
    /// `text` is the first candidate's text, or `None` when the submission failed.
    fn on_question_complete(&self, session: &str, number: i64, text: Option<&str>);
    fn on_submission_error(&self, session: &str, number: i64, attempt: u32, error: &str);
    fn on_session_complete(&self, session: &str, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_session_start(&self, _: &str, _: &SamplingConfig, _: usize) {}
    fn on_question_complete(&self, _: &str, _: i64, _: Option<&str>) {}
    fn on_submission_error(&self, _: &str, _: i64, _: u32, _: &str) {}
    fn on_session_complete(&self, _: &str, _: usize, _: Duration) {}
}

/// Outcome of a single recorded session.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub name: String,
    pub attempts: usize,
    pub failed: usize,
}

/// Totals for a whole sweep.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub sessions: Vec<SessionOutcome>,
    pub attempts: usize,
    pub failed_attempts: usize,
}

/// Records exam sessions against a completion provider.
pub struct SessionRunner {
    provider: Arc<dyn CompletionProvider>,
    store: SessionStore,
    config: RunnerConfig,
}

impl SessionRunner {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        store: SessionStore,
        config: RunnerConfig,
    ) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    /// Record `samples_per_config` sessions for every config in the grid.
    ///
    /// Only local I/O failures abort the run; submission failures are
    /// recorded as null responses.
    pub async fn run(
        &self,
        grid: &ParameterGrid,
        source: &QuestionSource,
        progress: &dyn ProgressReporter,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for params in grid {
            tracing::info!(%params, "running sweep point");
            for _ in 0..self.config.samples_per_config {
                let session = self.store.allocate()?;
                let outcome = self.run_session(&session, params, source, progress).await?;
                summary.attempts += outcome.attempts;
                summary.failed_attempts += outcome.failed;
                summary.sessions.push(outcome);
            }
        }

        Ok(summary)
    }

    /// Record one session into an already allocated directory.
    pub async fn run_session(
        &self,
        session: &SessionDir,
        params: SamplingConfig,
        source: &QuestionSource,
        progress: &dyn ProgressReporter,
    ) -> Result<SessionOutcome> {
        let start = Instant::now();
        let questions = source.load()?;
        tracing::info!(
            session = %session.name,
            questions = questions.len(),
            "loaded questions"
        );
        progress.on_session_start(&session.name, &params, questions.len());

        let mut record = SessionRecord::start(params);
        let mut failed = 0usize;

        for question in questions {
            let prompt = build_prompt(&question);
            let request = CompletionRequest {
                model: self.config.model.clone(),
                prompt: prompt.clone(),
                sampling: params,
            };
            let number = question.question_number;

            let submission = self
                .config
                .retry
                .run(
                    || self.provider.complete(&request),
                    |attempt, e| {
                        tracing::warn!(
                            session = %session.name,
                            category = %question.question_category,
                            number,
                            attempt,
                            "submission failed: {e:#}"
                        );
                        progress.on_submission_error(&session.name, number, attempt, &format!("{e:#}"));
                    },
                )
                .await;

            let model_response = match submission {
                Submission::Success(response) => {
                    progress.on_question_complete(&session.name, number, response.first_text());
                    Some(response.raw)
                }
                Submission::Failure { reason, attempts } => {
                    tracing::warn!(
                        session = %session.name,
                        number,
                        attempts,
                        "giving up on question: {reason}"
                    );
                    progress.on_question_complete(&session.name, number, None);
                    failed += 1;
                    None
                }
            };

            record.questions.push(QuestionAttempt {
                question_input: question,
                model_prompt: prompt,
                model_response,
            });
            session.write_record(&record)?;
        }

        record.finish();
        session.write_record(&record)?;

        let elapsed = start.elapsed();
        progress.on_session_complete(&session.name, failed, elapsed);
        tracing::info!(
            session = %session.name,
            attempts = record.questions.len(),
            failed,
            "session complete"
        );

        Ok(SessionOutcome {
            name: session.name.clone(),
            attempts: record.questions.len(),
            failed,
        })
    }
}
