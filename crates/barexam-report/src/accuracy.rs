//! Accuracy aggregated per sampling configuration.

use serde::Serialize;

use barexam_core::model::{SamplingConfig, SummaryRow};

/// Accuracy of all rows sharing one sampling configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigAccuracy {
    pub parameters: SamplingConfig,
    /// Distinct sessions contributing rows.
    pub sessions: usize,
    /// Scored questions across those sessions.
    pub questions: usize,
    pub first_accuracy: f64,
    pub top_two_accuracy: f64,
    pub top_three_accuracy: f64,
    /// Mean over sessions with a known duration.
    pub mean_session_secs: Option<f64>,
}

#[derive(Default)]
struct Tally {
    sessions: Vec<(String, Option<f64>)>,
    questions: usize,
    first: usize,
    top_two: usize,
    top_three: usize,
}

/// Group rows by their echoed sampling parameters, in first-seen order.
pub fn accuracy_by_config(rows: &[SummaryRow]) -> Vec<ConfigAccuracy> {
    let mut groups: Vec<(SamplingConfig, Tally)> = Vec::new();

    for row in rows {
        let params = row.sampling();
        let idx = match groups.iter().position(|(p, _)| *p == params) {
            Some(idx) => idx,
            None => {
                groups.push((params, Tally::default()));
                groups.len() - 1
            }
        };
        let tally = &mut groups[idx].1;

        if !tally.sessions.iter().any(|(name, _)| *name == row.exam_session) {
            tally
                .sessions
                .push((row.exam_session.clone(), row.session_duration));
        }
        tally.questions += 1;
        tally.first += usize::from(row.first_correct);
        tally.top_two += usize::from(row.top_two_correct);
        tally.top_three += usize::from(row.top_three_correct);
    }

    groups
        .into_iter()
        .map(|(parameters, t)| {
            let rate = |hits: usize| {
                if t.questions == 0 {
                    0.0
                } else {
                    hits as f64 / t.questions as f64
                }
            };
            let durations: Vec<f64> = t.sessions.iter().filter_map(|(_, d)| *d).collect();
            let mean_session_secs = (!durations.is_empty())
                .then(|| durations.iter().sum::<f64>() / durations.len() as f64);

            ConfigAccuracy {
                parameters,
                sessions: t.sessions.len(),
                questions: t.questions,
                first_accuracy: rate(t.first),
                top_two_accuracy: rate(t.top_two),
                top_three_accuracy: rate(t.top_three),
                mean_session_secs,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use barexam_core::model::Choice;

    fn row(session: &str, temperature: f64, ranks: [bool; 3], duration: Option<f64>) -> SummaryRow {
        let [first, second, third] = ranks;
        SummaryRow {
            exam_session: session.into(),
            category: "Torts".into(),
            number: 1,
            answer: None,
            second_answer: None,
            third_answer: None,
            correct_answer: Choice::B,
            first_correct: first,
            second_correct: second,
            third_correct: third,
            top_two_correct: first || second,
            top_three_correct: first || second || third,
            temperature,
            max_tokens: 16,
            top_p: 1.0,
            best_of: 1,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            session_duration: duration,
        }
    }

    #[test]
    fn groups_by_parameters_in_first_seen_order() {
        let rows = vec![
            row("bar-exam-001", 0.5, [true, false, false], Some(10.0)),
            row("bar-exam-001", 0.5, [false, true, false], Some(10.0)),
            row("bar-exam-002", 0.0, [false, false, true], None),
            row("bar-exam-003", 0.5, [false, false, false], Some(20.0)),
        ];
        let stats = accuracy_by_config(&rows);
        assert_eq!(stats.len(), 2);

        let warm = &stats[0];
        assert_eq!(warm.parameters.temperature, 0.5);
        assert_eq!(warm.sessions, 2);
        assert_eq!(warm.questions, 3);
        assert!((warm.first_accuracy - 1.0 / 3.0).abs() < 1e-9);
        assert!((warm.top_two_accuracy - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(warm.mean_session_secs, Some(15.0));

        let cold = &stats[1];
        assert_eq!(cold.parameters.temperature, 0.0);
        assert_eq!(cold.top_three_accuracy, 1.0);
        assert_eq!(cold.first_accuracy, 0.0);
        assert_eq!(cold.mean_session_secs, None);
    }

    #[test]
    fn empty_input() {
        assert!(accuracy_by_config(&[]).is_empty());
    }
}
