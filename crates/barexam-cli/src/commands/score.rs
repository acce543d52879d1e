//! The `barexam score` command.

use std::path::PathBuf;

use anyhow::Result;

use barexam_core::answer_key::AnswerKey;
use barexam_core::scorer::Scorer;
use barexam_core::store::SessionStore;
use barexam_providers::load_config_from;
use barexam_report::{accuracy_by_config, write_summary_csv, ConfigAccuracy};

pub fn execute(config_path: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let key = AnswerKey::load(&config.answer_key_path)?;
    let store = SessionStore::new(&config.sessions_dir);
    let report = Scorer::new(&key).score_store(&store)?;

    let summary_path = output.unwrap_or(config.summary_path);
    write_summary_csv(&report.rows, &summary_path)?;

    println!(
        "Scored {} sessions ({} rows) into {}",
        report.sessions,
        report.rows.len(),
        summary_path.display()
    );

    if !report.skipped.is_empty() {
        println!("{} question(s) skipped:", report.skipped.len());
        for skipped in &report.skipped {
            println!(
                "  [{} {}/{}] {}",
                skipped.session, skipped.category, skipped.number, skipped.reason
            );
        }
    }

    let stats = accuracy_by_config(&report.rows);
    if !stats.is_empty() {
        print_accuracy(&stats);
    }

    Ok(())
}

fn print_accuracy(stats: &[ConfigAccuracy]) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Temp",
        "Max tok",
        "Top p",
        "Best of",
        "Freq pen",
        "Pres pen",
        "Sessions",
        "First %",
        "Top 2 %",
        "Top 3 %",
        "Avg time",
    ]);

    for s in stats {
        let p = &s.parameters;
        let duration = s
            .mean_session_secs
            .map(|secs| format!("{secs:.1}s"))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(p.temperature),
            Cell::new(p.max_tokens),
            Cell::new(p.top_p),
            Cell::new(p.best_of),
            Cell::new(p.frequency_penalty),
            Cell::new(p.presence_penalty),
            Cell::new(s.sessions),
            Cell::new(format!("{:.1}%", s.first_accuracy * 100.0)),
            Cell::new(format!("{:.1}%", s.top_two_accuracy * 100.0)),
            Cell::new(format!("{:.1}%", s.top_three_accuracy * 100.0)),
            Cell::new(duration),
        ]);
    }

    println!("\n{table}");
}
