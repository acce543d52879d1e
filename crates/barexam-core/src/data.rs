//! Question source loading and pre-run validation.

use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::answer_key::AnswerKey;
use crate::model::Question;

/// A CSV file of exam questions.
///
/// Required columns: `question_category`, `question_number`,
/// `question_prompt`, `choice_a`..`choice_d`. Other columns are ignored.
#[derive(Debug, Clone)]
pub struct QuestionSource {
    path: PathBuf,
}

impl QuestionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read every question, in file order.
    pub fn load(&self) -> Result<Vec<Question>> {
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("failed to open question source: {}", self.path.display()))?;
        read_questions(file)
            .with_context(|| format!("failed to parse question source: {}", self.path.display()))
    }
}

/// Parse questions from any CSV reader.
pub fn read_questions<R: io::Read>(reader: R) -> Result<Vec<Question>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut questions = Vec::new();
    for (i, row) in csv_reader.deserialize::<Question>().enumerate() {
        // Line 1 is the header.
        let question = row.with_context(|| format!("invalid question on line {}", i + 2))?;
        questions.push(question);
    }
    Ok(questions)
}

/// A problem found while cross-checking questions against the answer key.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// `category/number` of the offending question.
    pub question: String,
    pub message: String,
}

/// Check that question identities are unique and that each resolves to
/// exactly one answer key row.
pub fn validate_exam(questions: &[Question], key: &AnswerKey) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    for q in questions {
        let id = format!("{}/{}", q.question_category, q.question_number);
        if !seen.insert((q.question_category.as_str(), q.question_number)) {
            warnings.push(ValidationWarning {
                question: id.clone(),
                message: "duplicate question identity".into(),
            });
        }
        if let Err(e) = key.resolve(&q.question_category, q.question_number) {
            warnings.push(ValidationWarning {
                question: id.clone(),
                message: e.to_string(),
            });
        }
        if q.question_prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question: id,
                message: "question prompt is empty".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUESTIONS_CSV: &str = "\
question_category,question_number,question_prompt,choice_a,choice_b,choice_c,choice_d,source
Torts,1,\"1. A hiker, lost in the woods, entered a cabin. Is she liable?\",Yes,No,\"Only if, and only if, damage occurred\",Maybe,book
Contracts,2,2. Was an offer made?,Yes,No,Sometimes,Never,book
";

    const KEY_CSV: &str = "\
category,number,answer
Torts,1,C
Contracts,2,A
";

    #[test]
    fn reads_questions_with_quoted_commas() {
        let questions = read_questions(QUESTIONS_CSV.as_bytes()).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question_category, "Torts");
        assert_eq!(questions[0].question_number, 1);
        assert_eq!(questions[0].choice_c, "Only if, and only if, damage occurred");
        assert_eq!(questions[1].question_prompt, "2. Was an offer made?");
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "question_category,question_number,question_prompt\nTorts,1,stem\n";
        assert!(read_questions(csv.as_bytes()).is_err());
    }

    #[test]
    fn non_integer_number_is_an_error() {
        let csv = "question_category,question_number,question_prompt,choice_a,choice_b,choice_c,choice_d\nTorts,one,s,a,b,c,d\n";
        let err = read_questions(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.csv");
        std::fs::write(&path, QUESTIONS_CSV).unwrap();
        let questions = QuestionSource::new(&path).load().unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = QuestionSource::new("/no/such/questions.csv").load().unwrap_err();
        assert!(err.to_string().contains("questions.csv"));
    }

    #[test]
    fn validate_clean_exam() {
        let questions = read_questions(QUESTIONS_CSV.as_bytes()).unwrap();
        let key = AnswerKey::from_reader(KEY_CSV.as_bytes()).unwrap();
        assert!(validate_exam(&questions, &key).is_empty());
    }

    #[test]
    fn validate_reports_unresolvable_and_duplicate_questions() {
        let mut questions = read_questions(QUESTIONS_CSV.as_bytes()).unwrap();
        questions.push(questions[1].clone());
        let mut orphan = questions[0].clone();
        orphan.question_number = 99;
        questions.push(orphan);

        let key = AnswerKey::from_reader(KEY_CSV.as_bytes()).unwrap();
        let warnings = validate_exam(&questions, &key);
        assert!(warnings
            .iter()
            .any(|w| w.question == "Contracts/2" && w.message.contains("duplicate")));
        assert!(warnings
            .iter()
            .any(|w| w.question == "Torts/99" && w.message.contains("not found")));
    }

    #[test]
    fn warnings_follow_question_order() {
        let mut questions = read_questions(QUESTIONS_CSV.as_bytes()).unwrap();
        questions[0].question_prompt = "  ".into();
        let key = AnswerKey::from_reader("category,number,answer\nTorts,1,\n".as_bytes()).unwrap();

        let warnings = validate_exam(&questions, &key);
        let summary: Vec<(&str, &str)> = warnings
            .iter()
            .map(|w| (w.question.as_str(), w.message.as_str()))
            .collect();
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].0, "Torts/1");
        assert!(summary[0].1.contains("not a choice"));
        assert_eq!(summary[1], ("Torts/1", "question prompt is empty"));
        assert_eq!(summary[2].0, "Contracts/2");
        assert!(summary[2].1.contains("not found"));
    }
}
