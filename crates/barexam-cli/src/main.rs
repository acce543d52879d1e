//! barexam CLI: record exam sessions and score them.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "barexam",
    version,
    about = "Run and score multiple-choice bar exams against a completion model"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record exam sessions for every point of the parameter sweep
    Run {
        /// Config file path (default: ./barexam.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score all recorded sessions and write the summary CSV
    Score {
        /// Config file path (default: ./barexam.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Summary CSV path, overriding `summary_path`
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check the question set and answer key without calling the model
    Validate {
        /// Config file path (default: ./barexam.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter barexam.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("barexam=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config } => commands::run::execute(config).await,
        Commands::Score { config, output } => commands::score::execute(config, output),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
