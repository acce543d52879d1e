//! The `barexam validate` command.

use std::path::PathBuf;

use anyhow::Result;

use barexam_core::answer_key::AnswerKey;
use barexam_core::data::{validate_exam, QuestionSource};
use barexam_providers::load_config_from;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    config.validate()?;

    let questions = QuestionSource::new(&config.questions_path).load()?;
    let key = AnswerKey::load(&config.answer_key_path)?;

    println!(
        "Exam: {} questions, {} answer key rows",
        questions.len(),
        key.len()
    );
    println!(
        "Sweep: {} configs x {} samples = {} sessions",
        config.sweep.len(),
        config.samples_per_config,
        config.sweep.len() * config.samples_per_config as usize
    );

    let warnings = validate_exam(&questions, &key);
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.question, w.message);
    }

    if warnings.is_empty() {
        println!("Exam valid.");
        Ok(())
    } else {
        anyhow::bail!("{} warning(s) found", warnings.len())
    }
}
