//! The `barexam init` command.

use std::path::Path;

use anyhow::Result;

use barexam_providers::config::DEFAULT_CONFIG_FILE;

pub fn execute() -> Result<()> {
    if Path::new(DEFAULT_CONFIG_FILE).exists() {
        println!("{DEFAULT_CONFIG_FILE} already exists, skipping.");
    } else {
        std::fs::write(DEFAULT_CONFIG_FILE, SAMPLE_CONFIG)?;
        println!("Created {DEFAULT_CONFIG_FILE}");
    }

    println!("\nNext steps:");
    println!("  1. Put your OpenAI API key in .openai_key");
    println!("  2. Place the exam under data/ (questions.csv, answer_key_category.csv)");
    println!("  3. Run: barexam validate");
    println!("  4. Run: barexam run && barexam score");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# barexam configuration

model = "text-davinci-003"
samples_per_config = 3
max_retries = 1
retry_delay_secs = 10
questions_path = "data/questions.csv"
answer_key_path = "data/answer_key_category.csv"
sessions_dir = "sessions"
summary_path = "all_exam_summary.csv"

[provider]
type = "openai"
api_key_file = ".openai_key"
# base_url = "https://api.openai.com"
# org_id = "org-..."

[sweep]
temperature = [0.0, 0.5, 1.0]
max_tokens = [16]
top_p = [1.0, 0.75]
best_of = [1, 2, 4]
frequency_penalty = [0.0]
presence_penalty = [0.0]
"#;
