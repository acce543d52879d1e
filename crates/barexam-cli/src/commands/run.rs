//! The `barexam run` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use barexam_core::data::QuestionSource;
use barexam_core::model::SamplingConfig;
use barexam_core::session::{ProgressReporter, SessionRunner};
use barexam_core::store::SessionStore;
use barexam_core::traits::CompletionProvider;
use barexam_providers::{create_provider, load_config_from};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_session_start(&self, session: &str, params: &SamplingConfig, questions: usize) {
        eprintln!("Session {session}: {questions} questions [{params}]");
    }

    fn on_question_complete(&self, session: &str, number: i64, text: Option<&str>) {
        match text {
            Some(text) => {
                let first_line = text.trim().lines().next().unwrap_or_default();
                eprintln!("  {session} #{number}: {first_line}");
            }
            None => eprintln!("  {session} #{number}: no response"),
        }
    }

    fn on_submission_error(&self, session: &str, number: i64, attempt: u32, error: &str) {
        eprintln!("  ERROR: {session} #{number} (attempt {attempt}): {error}");
    }

    fn on_session_complete(&self, session: &str, failed: usize, elapsed: Duration) {
        eprintln!(
            "Session {session} done, {failed} unanswered ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    config.validate()?;

    let provider: Arc<dyn CompletionProvider> = Arc::from(create_provider(&config.provider)?);
    tracing::info!(
        provider = provider.name(),
        model = %config.model,
        sweep = config.sweep.len(),
        samples = config.samples_per_config,
        "starting exam run"
    );

    let source = QuestionSource::new(&config.questions_path);
    let store = SessionStore::new(&config.sessions_dir);
    let runner = SessionRunner::new(provider, store, config.runner_config());

    let summary = runner.run(&config.sweep, &source, &ConsoleReporter).await?;

    eprintln!(
        "\nComplete: {} sessions, {} questions submitted, {} without a response",
        summary.sessions.len(),
        summary.attempts,
        summary.failed_attempts
    );
    if let (Some(first), Some(last)) = (summary.sessions.first(), summary.sessions.last()) {
        eprintln!(
            "Sessions {}..{} written to {}",
            first.name,
            last.name,
            config.sessions_dir.display()
        );
    }

    Ok(())
}
