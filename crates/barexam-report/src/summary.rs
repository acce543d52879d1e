//! Summary CSV output, one row per scored (session, question).

use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use barexam_core::model::SummaryRow;

/// Column order of the summary CSV.
pub const SUMMARY_COLUMNS: [&str; 19] = [
    "exam_session",
    "category",
    "number",
    "answer",
    "second_answer",
    "third_answer",
    "correct_answer",
    "first_correct",
    "second_correct",
    "third_correct",
    "top_two_correct",
    "top_three_correct",
    "temperature",
    "max_tokens",
    "top_p",
    "best_of",
    "frequency_penalty",
    "presence_penalty",
    "session_duration",
];

/// Write the summary to `path`, replacing any previous file.
pub fn write_summary_csv(rows: &[SummaryRow], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create summary: {}", path.display()))?;
    write_summary(rows, file)
        .with_context(|| format!("failed to write summary to {}", path.display()))
}

/// Write the summary CSV to any writer.
///
/// The header is written explicitly so an empty summary still has columns.
pub fn write_summary<W: io::Write>(rows: &[SummaryRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(SUMMARY_COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
