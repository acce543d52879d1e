//! barexam-core: exam model, session runner, and scoring.
//!
//! This crate defines the data model for exam sessions, the prompt and
//! response formats, the sampling sweep, and the two halves of the pipeline:
//! recording sessions against a completion service and scoring them against
//! an answer key.

pub mod answer_key;
pub mod data;
pub mod error;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod retry;
pub mod scorer;
pub mod session;
pub mod store;
pub mod sweep;
pub mod traits;
