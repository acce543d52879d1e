//! On-disk session directories and record persistence.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::SessionRecord;

/// Prefix of every session directory name.
pub const SESSION_PREFIX: &str = "bar-exam-";
/// File holding the session record inside a session directory.
pub const RECORD_FILE: &str = "exam_data.json";

/// Format the directory name for a session number (`bar-exam-007`).
pub fn session_name(number: u32) -> String {
    format!("{SESSION_PREFIX}{number:03}")
}

/// The root directory holding all session directories.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

/// A session directory allocated for writing.
#[derive(Debug, Clone)]
pub struct SessionDir {
    pub name: String,
    pub path: PathBuf,
}

impl SessionDir {
    pub fn record_path(&self) -> PathBuf {
        self.path.join(RECORD_FILE)
    }

    /// Overwrite the session record with its current state.
    pub fn write_record(&self, record: &SessionRecord) -> Result<()> {
        write_record_atomic(&self.record_path(), record)
    }
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the next unused session directory, numbering from 1.
    ///
    /// Numbers already present on disk are skipped, never reused.
    pub fn allocate(&self) -> Result<SessionDir> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create sessions root: {}", self.root.display()))?;

        let mut number = 1u32;
        loop {
            let name = session_name(number);
            let path = self.root.join(&name);
            match fs::create_dir(&path) {
                Ok(()) => return Ok(SessionDir { name, path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    number = number
                        .checked_add(1)
                        .context("session numbers exhausted")?;
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("failed to create session directory: {}", path.display())
                    })
                }
            }
        }
    }

    /// Session directories that contain a record, sorted by name.
    pub fn recorded_sessions(&self) -> Result<Vec<SessionDir>> {
        let mut sessions = Vec::new();
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("failed to read sessions root: {}", self.root.display()))?;

        for entry in entries {
            let entry = entry.with_context(|| {
                format!("failed to read sessions root: {}", self.root.display())
            })?;
            let path = entry.path();
            if !path.join(RECORD_FILE).is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            sessions.push(SessionDir { name, path });
        }

        sessions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sessions)
    }
}

/// Read a session record from disk.
pub fn read_record(path: &Path) -> Result<SessionRecord> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read session record: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse session record: {}", path.display()))
}

/// Write the record to a temp file beside `path`, fsync, then rename over it.
fn write_record_atomic(path: &Path, record: &SessionRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record).context("failed to serialize session record")?;
    let dir = path
        .parent()
        .with_context(|| format!("no parent directory for {}", path.display()))?;

    let tmp_path = dir.join(format!(".{RECORD_FILE}.tmp"));
    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;
    file.write_all(json.as_bytes())
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("failed to fsync {}", tmp_path.display()))?;
    drop(file);

    fs::rename(&tmp_path, path).with_context(|| {
        format!("failed to rename {} to {}", tmp_path.display(), path.display())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SamplingConfig;

    fn sampling() -> SamplingConfig {
        SamplingConfig {
            temperature: 0.0,
            max_tokens: 16,
            top_p: 1.0,
            best_of: 1,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }

    #[test]
    fn session_names_are_zero_padded() {
        assert_eq!(session_name(1), "bar-exam-001");
        assert_eq!(session_name(42), "bar-exam-042");
        assert_eq!(session_name(1234), "bar-exam-1234");
    }

    #[test]
    fn allocates_after_existing_sessions() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("bar-exam-001")).unwrap();
        fs::create_dir(dir.path().join("bar-exam-002")).unwrap();

        let store = SessionStore::new(dir.path());
        let session = store.allocate().unwrap();
        assert_eq!(session.name, "bar-exam-003");
        assert!(session.path.is_dir());
    }

    #[test]
    fn allocation_fills_gaps_and_is_monotonic_within_a_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("bar-exam-002")).unwrap();

        let store = SessionStore::new(dir.path());
        assert_eq!(store.allocate().unwrap().name, "bar-exam-001");
        assert_eq!(store.allocate().unwrap().name, "bar-exam-003");
        assert_eq!(store.allocate().unwrap().name, "bar-exam-004");
    }

    #[test]
    fn allocate_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("sessions"));
        assert_eq!(store.allocate().unwrap().name, "bar-exam-001");
    }

    #[test]
    fn record_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let session = store.allocate().unwrap();

        let mut record = SessionRecord::start(sampling());
        session.write_record(&record).unwrap();
        record.finish();
        session.write_record(&record).unwrap();

        let loaded = read_record(&session.record_path()).unwrap();
        assert_eq!(loaded, record);
        assert!(!session.path.join(".exam_data.json.tmp").exists());
    }

    #[test]
    fn recorded_sessions_skip_empty_dirs_and_sort() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let record = SessionRecord::start(sampling());

        for name in ["bar-exam-010", "bar-exam-002"] {
            let path = dir.path().join(name);
            fs::create_dir(&path).unwrap();
            fs::write(
                path.join(RECORD_FILE),
                serde_json::to_string(&record).unwrap(),
            )
            .unwrap();
        }
        fs::create_dir(dir.path().join("bar-exam-005")).unwrap();

        let names: Vec<String> = store
            .recorded_sessions()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["bar-exam-002", "bar-exam-010"]);
    }

    #[test]
    fn recorded_sessions_missing_root_is_an_error() {
        let store = SessionStore::new("/no/such/sessions/root");
        assert!(store.recorded_sessions().is_err());
    }
}
