//! Ranked-answer extraction from completion text.

use crate::model::ParsedAnswer;

const FIRST_LABEL: &str = "First Choice";
const SECOND_LABEL: &str = "Second Choice";
const THIRD_LABEL: &str = "Third Choice";

/// Extract the first/second/third ranked letters from a response.
///
/// Handles lines like:
/// - `First Choice: B`
/// - `Second Choice: (D)`
/// - `Third Choice: A.`
///
/// Unlabelled lines are ignored, so trailing explanations are harmless. A
/// label that appears twice keeps its last occurrence.
pub fn parse_response(response: &str) -> ParsedAnswer {
    let mut parsed = ParsedAnswer::default();

    for line in response.split(is_line_break) {
        let line = line.trim();

        let slot = if line.starts_with(FIRST_LABEL) {
            &mut parsed.first
        } else if line.starts_with(SECOND_LABEL) {
            &mut parsed.second
        } else if line.starts_with(THIRD_LABEL) {
            &mut parsed.third
        } else {
            continue;
        };

        if let Some(token) = line.split_whitespace().last() {
            *slot = Some(clean_token(token));
        }
    }

    parsed
}

/// Every line terminator, including bare `\r` and the Unicode separators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn clean_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '.'))
        .collect::<String>()
        .trim()
        .to_string()
}
