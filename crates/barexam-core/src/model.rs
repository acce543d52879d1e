//! Core data model types for barexam.
//!
//! These types describe exam questions, the sampling parameters a session
//! runs under, the session record persisted to disk, and the summary rows
//! the scorer derives from it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single exam question as read from the question source.
///
/// Field names match the question source columns and the `question_input`
/// object of the session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question_category: String,
    pub question_number: i64,
    /// Question stem, possibly prefixed by an enumerator like `"12. "`.
    pub question_prompt: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
}

/// One of the four answer letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::A => "A",
            Choice::B => "B",
            Choice::C => "C",
            Choice::D => "D",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '(' | ')' | '.'))
            .collect();
        match cleaned.trim().to_uppercase().as_str() {
            "A" => Ok(Choice::A),
            "B" => Ok(Choice::B),
            "C" => Ok(Choice::C),
            "D" => Ok(Choice::D),
            _ => Err(format!("unknown choice: {s:?}")),
        }
    }
}

/// One answer key row.
///
/// The answer is kept as written; it is only checked to be a letter when a
/// question resolves against the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerKeyEntry {
    pub category: String,
    pub number: i64,
    pub answer: String,
}

/// Sampling parameters for one point of the sweep.
///
/// Repetitions of a session share the same config, so this is not a unique
/// session identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub best_of: u32,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

impl fmt::Display for SamplingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "temperature={} max_tokens={} top_p={} best_of={} frequency_penalty={} presence_penalty={}",
            self.temperature,
            self.max_tokens,
            self.top_p,
            self.best_of,
            self.frequency_penalty,
            self.presence_penalty
        )
    }
}

/// The persisted state of one exam session (`exam_data.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub parameters: SamplingConfig,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionAttempt>,
}

impl SessionRecord {
    /// Start a new record stamped with the current local time.
    pub fn start(parameters: SamplingConfig) -> Self {
        Self {
            parameters,
            start_time: timestamp_now(),
            end_time: None,
            questions: Vec::new(),
        }
    }

    /// Mark the session finished.
    pub fn finish(&mut self) {
        self.end_time = Some(timestamp_now());
    }

    /// Wall-clock session duration in seconds, if both timestamps parse.
    pub fn duration_secs(&self) -> Option<f64> {
        let start = parse_timestamp(&self.start_time)?;
        let end = parse_timestamp(self.end_time.as_deref()?)?;
        let elapsed = end - start;
        Some(elapsed.num_microseconds()? as f64 / 1_000_000.0)
    }
}

/// One question submitted during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAttempt {
    pub question_input: Question,
    pub model_prompt: String,
    /// Raw service response body; `None` when every submission failed.
    pub model_response: Option<serde_json::Value>,
}

/// Ranked choices extracted from a response text.
///
/// Tokens are kept as written (after cleanup), so a malformed answer such as
/// `"E"` is preserved and simply never matches the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAnswer {
    pub first: Option<String>,
    pub second: Option<String>,
    pub third: Option<String>,
}

/// One scored (session, question) pair. Column order is the CSV order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub exam_session: String,
    pub category: String,
    pub number: i64,
    pub answer: Option<String>,
    pub second_answer: Option<String>,
    pub third_answer: Option<String>,
    pub correct_answer: Choice,
    pub first_correct: bool,
    pub second_correct: bool,
    pub third_correct: bool,
    pub top_two_correct: bool,
    pub top_three_correct: bool,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub best_of: u32,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub session_duration: Option<f64>,
}

impl SummaryRow {
    /// The sampling parameters echoed in this row.
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            best_of: self.best_of,
            frequency_penalty: self.frequency_penalty,
            presence_penalty: self.presence_penalty,
        }
    }
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Current local time as an ISO-8601 timestamp with microseconds.
pub fn timestamp_now() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Parse a session timestamp, with or without fractional seconds or offset.
///
/// Everything is brought to local wall-clock time, the form
/// [`timestamp_now`] writes, so offset and offset-less values can be mixed.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()
}
