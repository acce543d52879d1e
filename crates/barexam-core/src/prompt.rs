//! Prompt templating for exam questions.

use crate::model::Question;

/// Instruction block placed before every question.
pub const RANKED_ANSWER_INSTRUCTIONS: &str = "Please answer the following Bar Exam question in the following rank order format:
First Choice: <LETTER>
Second Choice: <LETTER>
Third Choice: <LETTER>";

/// Render the ranked top-three prompt for a question.
pub fn build_prompt(question: &Question) -> String {
    let stem = strip_enumerator(&question.question_prompt);

    format!(
        "{RANKED_ANSWER_INSTRUCTIONS}\n\nQuestion: {stem}\n(A) {}\n(B) {}\n(C) {}\n(D) {}\nAnswer:",
        question.choice_a.trim(),
        question.choice_b.trim(),
        question.choice_c.trim(),
        question.choice_d.trim(),
    )
}

/// Drop everything up to the first `". "` (e.g. `"12. "`), then trim.
///
/// Stems without the delimiter are only trimmed.
fn strip_enumerator(stem: &str) -> &str {
    match stem.find(". ") {
        Some(idx) => stem[idx + 1..].trim(),
        None => stem.trim(),
    }
}
