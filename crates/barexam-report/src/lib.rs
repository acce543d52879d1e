//! barexam-report: summary output for scored sessions.

pub mod accuracy;
pub mod summary;

pub use accuracy::{accuracy_by_config, ConfigAccuracy};
pub use summary::{write_summary, write_summary_csv};
