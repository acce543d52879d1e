//! Answer key loading and lookup.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::ScoringError;
use crate::model::{AnswerKeyEntry, Choice};

/// The authoritative mapping from (category, number) to the correct choice.
///
/// Uniqueness is not enforced at load time: a duplicated row only becomes an
/// error when a question actually resolves against it.
#[derive(Debug, Clone, Default)]
pub struct AnswerKey {
    entries: Vec<AnswerKeyEntry>,
}

impl AnswerKey {
    /// Load a key from a CSV file with a header row.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open answer key: {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("failed to parse answer key: {}", path.display()))
    }

    /// Parse a key from CSV. The first three columns are read positionally as
    /// category, number, and correct answer, whatever the header says.
    ///
    /// A non-integer number is a load error; the answer column is not checked
    /// until [`AnswerKey::resolve`] reaches the row.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut entries = Vec::new();

        for (i, record) in csv_reader.records().enumerate() {
            let line = i + 2;
            let record = record.with_context(|| format!("invalid answer key row on line {line}"))?;
            anyhow::ensure!(
                record.len() >= 3,
                "answer key row on line {line} has {} columns, expected 3",
                record.len()
            );

            let number = record[1]
                .trim()
                .parse::<i64>()
                .with_context(|| format!("invalid question number {:?} on line {line}", &record[1]))?;

            entries.push(AnswerKeyEntry {
                category: record[0].to_string(),
                number,
                answer: record[2].to_string(),
            });
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the single correct choice for a question.
    pub fn resolve(&self, category: &str, number: i64) -> Result<Choice, ScoringError> {
        let mut matches = self
            .entries
            .iter()
            .filter(|e| e.category == category && e.number == number);

        let Some(first) = matches.next() else {
            return Err(ScoringError::NoMatch {
                category: category.to_string(),
                number,
            });
        };

        let extra = matches.count();
        if extra > 0 {
            return Err(ScoringError::NonUniqueMatch {
                category: category.to_string(),
                number,
                count: extra + 1,
            });
        }

        first
            .answer
            .parse::<Choice>()
            .map_err(|_| ScoringError::InvalidAnswer {
                category: category.to_string(),
                number,
                answer: first.answer.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_positional() {
        let csv = "Subject,Q#,Key\nTorts,1,B\nTorts,2,d\n";
        let key = AnswerKey::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(key.len(), 2);
        assert_eq!(key.resolve("Torts", 1), Ok(Choice::B));
        assert_eq!(key.resolve("Torts", 2), Ok(Choice::D));
    }

    #[test]
    fn no_match_is_fatal() {
        let key = AnswerKey::from_reader("c,n,a\nTorts,1,B\n".as_bytes()).unwrap();
        assert_eq!(
            key.resolve("Torts", 2),
            Err(ScoringError::NoMatch {
                category: "Torts".into(),
                number: 2,
            })
        );
        assert!(matches!(
            key.resolve("Property", 1),
            Err(ScoringError::NoMatch { .. })
        ));
    }

    #[test]
    fn duplicate_rows_are_non_unique() {
        let csv = "c,n,a\nTorts,1,B\nTorts,1,C\nTorts,2,A\n";
        let key = AnswerKey::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            key.resolve("Torts", 1),
            Err(ScoringError::NonUniqueMatch {
                category: "Torts".into(),
                number: 1,
                count: 2,
            })
        );
        // Other questions still resolve.
        assert_eq!(key.resolve("Torts", 2), Ok(Choice::A));
    }

    #[test]
    fn invalid_letter_fails_only_when_resolved() {
        let key = AnswerKey::from_reader("c,n,a\nTorts,1,B\nTorts,2,\nTorts,3,E\n".as_bytes())
            .unwrap();
        assert_eq!(key.len(), 3);
        assert_eq!(key.resolve("Torts", 1), Ok(Choice::B));
        assert_eq!(
            key.resolve("Torts", 2),
            Err(ScoringError::InvalidAnswer {
                category: "Torts".into(),
                number: 2,
                answer: String::new(),
            })
        );
        assert!(matches!(
            key.resolve("Torts", 3),
            Err(ScoringError::InvalidAnswer { .. })
        ));
    }

    #[test]
    fn invalid_number_is_a_load_error() {
        let err = AnswerKey::from_reader("c,n,a\nTorts,x,A\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid question number"));
    }

    #[test]
    fn load_missing_file() {
        let err = AnswerKey::load(Path::new("/no/such/key.csv")).unwrap_err();
        assert!(err.to_string().contains("key.csv"));
    }
}
