//! Reduce recorded sessions into per-question summary rows.

use anyhow::{Context, Result};

use crate::answer_key::AnswerKey;
use crate::model::{Choice, ParsedAnswer, QuestionAttempt, SessionRecord, SummaryRow};
use crate::parser::parse_response;
use crate::store::{read_record, SessionStore};
use crate::traits::CompletionBody;

/// An attempt left out of the summary, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAttempt {
    pub session: String,
    pub category: String,
    pub number: i64,
    pub reason: String,
}

/// Everything produced by one scoring pass.
#[derive(Debug, Clone, Default)]
pub struct ScoreReport {
    pub rows: Vec<SummaryRow>,
    pub skipped: Vec<SkippedAttempt>,
    pub sessions: usize,
}

/// Rank-1/2/3 correctness plus cumulative flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Correctness {
    pub first: bool,
    pub second: bool,
    pub third: bool,
    pub top_two: bool,
    pub top_three: bool,
}

impl Correctness {
    pub fn evaluate(parsed: &ParsedAnswer, correct: Choice) -> Self {
        let is = |slot: &Option<String>| slot.as_deref() == Some(correct.as_str());
        let first = is(&parsed.first);
        let second = is(&parsed.second);
        let third = is(&parsed.third);
        Self {
            first,
            second,
            third,
            top_two: first || second,
            top_three: first || second || third,
        }
    }
}

/// Scores sessions against an answer key.
pub struct Scorer<'a> {
    key: &'a AnswerKey,
}

impl<'a> Scorer<'a> {
    pub fn new(key: &'a AnswerKey) -> Self {
        Self { key }
    }

    /// Score every recorded session in the store, in directory-name order.
    ///
    /// Fails on the first question that does not resolve to exactly one
    /// answer key row.
    pub fn score_store(&self, store: &SessionStore) -> Result<ScoreReport> {
        let mut report = ScoreReport::default();

        for session in store.recorded_sessions()? {
            let record = read_record(&session.record_path())?;
            self.score_session(&session.name, &record, &mut report)
                .with_context(|| format!("failed to score session {}", session.name))?;
            report.sessions += 1;
        }

        tracing::info!(
            sessions = report.sessions,
            rows = report.rows.len(),
            skipped = report.skipped.len(),
            "scoring complete"
        );
        Ok(report)
    }

    /// Score one session's attempts, appending to `report`.
    pub fn score_session(
        &self,
        session: &str,
        record: &SessionRecord,
        report: &mut ScoreReport,
    ) -> Result<()> {
        let duration = record.duration_secs();

        for attempt in &record.questions {
            let question = &attempt.question_input;
            let correct = self
                .key
                .resolve(&question.question_category, question.question_number)?;

            let parsed = match response_text(attempt) {
                ResponseText::Missing => ParsedAnswer::default(),
                ResponseText::Text(text) => parse_response(&text),
                ResponseText::Unusable(reason) => {
                    tracing::warn!(
                        session,
                        category = %question.question_category,
                        number = question.question_number,
                        "skipping question: {reason}"
                    );
                    report.skipped.push(SkippedAttempt {
                        session: session.to_string(),
                        category: question.question_category.clone(),
                        number: question.question_number,
                        reason,
                    });
                    continue;
                }
            };

            let flags = Correctness::evaluate(&parsed, correct);
            let params = &record.parameters;
            report.rows.push(SummaryRow {
                exam_session: session.to_string(),
                category: question.question_category.clone(),
                number: question.question_number,
                answer: parsed.first,
                second_answer: parsed.second,
                third_answer: parsed.third,
                correct_answer: correct,
                first_correct: flags.first,
                second_correct: flags.second,
                third_correct: flags.third,
                top_two_correct: flags.top_two,
                top_three_correct: flags.top_three,
                temperature: params.temperature,
                max_tokens: params.max_tokens,
                top_p: params.top_p,
                best_of: params.best_of,
                frequency_penalty: params.frequency_penalty,
                presence_penalty: params.presence_penalty,
                session_duration: duration,
            });
        }

        Ok(())
    }
}

enum ResponseText {
    /// Every submission failed.
    Missing,
    Text(String),
    /// The body cannot be scored (wrong shape or candidate count).
    Unusable(String),
}

fn response_text(attempt: &QuestionAttempt) -> ResponseText {
    let Some(value) = &attempt.model_response else {
        return ResponseText::Missing;
    };
    let body = match CompletionBody::from_value(value) {
        Ok(body) => body,
        Err(e) => return ResponseText::Unusable(format!("malformed response: {e}")),
    };
    match <[_; 1]>::try_from(body.choices) {
        Ok([choice]) => ResponseText::Text(choice.text),
        Err(choices) => ResponseText::Unusable(format!(
            "expected exactly one candidate completion, got {}",
            choices.len()
        )),
    }
}
