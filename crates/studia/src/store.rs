//! Durable timer state
//!
//! Persists a [`Snapshot`] of configuration and session history as a single
//! JSON file, with a one-generation backup at a sibling `.bak` path:
//! - Primary: <data_dir>/timer_data.json
//! - Backup:  <data_dir>/timer_data.json.bak
//!
//! Saves replace the file wholesale; loads never raise, falling back to the
//! backup and then to an absent result.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::{PomodoroConfig, RevisionConfig};
use crate::session::SessionRecord;

/// Primary store file name
const DATA_FILE: &str = "timer_data.json";
/// Suffix appended to the primary path for the backup copy
const BACKUP_SUFFIX: &str = ".bak";

/// Configuration section of the durable format; the variant is inferred
/// from the keys present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigSection {
    Pomodoro(PomodoroConfig),
    Revision(RevisionConfig),
}

/// Complete persisted representation of a timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Duration configuration
    pub timer_config: ConfigSection,
    /// Lifetime completed-session count
    pub sessions_completed: u32,
    /// Full session history, insertion order = completion order
    pub completed_sessions: Vec<SessionRecord>,
    /// Local timestamp of the save that produced this snapshot
    #[serde(default)]
    pub last_saved: String,
    /// Study notes (extended study timer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_notes: Option<Vec<String>>,
    /// Daily focus goal in minutes (extended study timer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_goal_minutes: Option<u32>,
}

/// Timer snapshot store
pub struct TimerStore {
    /// Directory holding the data file and its backup
    data_dir: PathBuf,
}

impl TimerStore {
    /// Create a store rooted at the given data directory
    pub fn new(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).with_context(|| {
            format!("Failed to create data directory: {}", data_dir.display())
        })?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Path to the primary data file
    pub fn data_path(&self) -> PathBuf {
        self.data_dir.join(DATA_FILE)
    }

    /// Path to the backup copy
    pub fn backup_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}{}", DATA_FILE, BACKUP_SUFFIX))
    }

    /// Write the snapshot as a complete replacement of the durable store.
    ///
    /// Any pre-existing primary file is copied to the backup path first; a
    /// failed copy is logged and the save proceeds.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let path = self.data_path();

        if path.exists() {
            if let Err(e) = fs::copy(&path, self.backup_path()) {
                warn!("could not refresh backup copy: {}", e);
            }
        }

        let content =
            serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write timer data: {}", path.display()))
    }

    /// Load the latest snapshot.
    ///
    /// Returns `None` when the primary file is absent. A primary that fails
    /// to parse or lacks a required field falls back to the backup; if that
    /// also fails, the result is `None`. Failures are logged, never raised.
    pub fn load(&self) -> Option<Snapshot> {
        let path = self.data_path();
        if !path.exists() {
            return None;
        }

        match read_snapshot(&path) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("could not load {}: {}", path.display(), e);
                self.load_backup()
            }
        }
    }

    fn load_backup(&self) -> Option<Snapshot> {
        let path = self.backup_path();
        if !path.exists() {
            return None;
        }

        match read_snapshot(&path) {
            Ok(snapshot) => {
                warn!("recovered timer data from backup copy");
                Some(snapshot)
            }
            Err(e) => {
                warn!("could not load backup {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Read and parse a snapshot file; required fields are enforced by serde
fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&content).context("Failed to parse snapshot JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionType;
    use std::env;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_store(test_name: &str) -> (TimerStore, PathBuf) {
        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = env::temp_dir().join(format!(
            "studia_test_{}_{}_{}",
            std::process::id(),
            test_name,
            counter
        ));
        let _ = fs::remove_dir_all(&temp_dir);
        let store = TimerStore::new(&temp_dir).unwrap();
        (store, temp_dir)
    }

    fn sample_snapshot(sessions: u32) -> Snapshot {
        let completed_sessions = (1..=sessions)
            .map(|n| SessionRecord {
                session_type: SessionType::Work,
                duration: 25,
                completed_at: format!("2026-08-06 0{}:00:00", n),
                session_number: n,
            })
            .collect();

        Snapshot {
            timer_config: ConfigSection::Pomodoro(PomodoroConfig::default()),
            sessions_completed: sessions,
            completed_sessions,
            last_saved: "2026-08-06 09:00:00".to_string(),
            study_notes: Some(vec!["review chapter 3".to_string()]),
            daily_goal_minutes: Some(120),
        }
    }

    #[test]
    fn test_load_absent_store() {
        let (store, temp_dir) = temp_store("absent");
        assert!(store.load().is_none());
        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (store, temp_dir) = temp_store("roundtrip");

        let snapshot = sample_snapshot(3);
        store.save(&snapshot).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.completed_sessions.len(), 3);

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_second_save_creates_backup() {
        let (store, temp_dir) = temp_store("backup");

        store.save(&sample_snapshot(1)).unwrap();
        assert!(!store.backup_path().exists());

        store.save(&sample_snapshot(2)).unwrap();
        assert!(store.backup_path().exists());

        // The backup holds the superseded generation
        let backup: Snapshot =
            serde_json::from_str(&fs::read_to_string(store.backup_path()).unwrap()).unwrap();
        assert_eq!(backup.sessions_completed, 1);

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_corrupt_primary_falls_back_to_backup() {
        let (store, temp_dir) = temp_store("corrupt");

        store.save(&sample_snapshot(2)).unwrap();
        store.save(&sample_snapshot(5)).unwrap();
        fs::write(store.data_path(), "{ not json").unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.sessions_completed, 2);

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_missing_required_field_falls_back() {
        let (store, temp_dir) = temp_store("missing_field");

        store.save(&sample_snapshot(4)).unwrap();
        store.save(&sample_snapshot(7)).unwrap();

        // Drop the record sequence from the primary; the backup should win
        fs::write(
            store.data_path(),
            r#"{"timer_config": {"work_duration": 25, "short_break": 5, "long_break": 15, "sessions_until_long_break": 4}, "sessions_completed": 7}"#,
        )
        .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.sessions_completed, 4);

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_corrupt_primary_without_backup_is_absent() {
        let (store, temp_dir) = temp_store("no_backup");

        fs::write(store.data_path(), "garbage").unwrap();
        assert!(store.load().is_none());

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_missing_last_saved_is_tolerated() {
        let (store, temp_dir) = temp_store("no_last_saved");

        fs::write(
            store.data_path(),
            r#"{"timer_config": {"duration": 60}, "sessions_completed": 1, "completed_sessions": []}"#,
        )
        .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(
            loaded.timer_config,
            ConfigSection::Revision(RevisionConfig { duration: 60 })
        );
        assert!(loaded.last_saved.is_empty());

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_config_section_distinguishes_variants() {
        let pomodoro = serde_json::to_string(&ConfigSection::Pomodoro(PomodoroConfig::default()))
            .unwrap();
        let parsed: ConfigSection = serde_json::from_str(&pomodoro).unwrap();
        assert!(matches!(parsed, ConfigSection::Pomodoro(_)));

        let revision: ConfigSection = serde_json::from_str(r#"{"duration": 45}"#).unwrap();
        assert_eq!(
            revision,
            ConfigSection::Revision(RevisionConfig { duration: 45 })
        );
    }
}
