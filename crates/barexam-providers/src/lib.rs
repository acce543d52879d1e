//! barexam-providers: completion service clients.
//!
//! Implements the `CompletionProvider` trait for the OpenAI completions API
//! and a scripted mock, plus loading of `barexam.toml`.

pub mod config;
pub mod mock;
pub mod openai;

pub use barexam_core::error::ProviderError;
pub use config::{create_provider, load_config_from, BarExamConfig, ProviderConfig};
