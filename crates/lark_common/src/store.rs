//! Durable update-check state.
//!
//! Three values survive process restarts: the earliest time the next feed
//! check is permitted, the creation time of the last acknowledged release,
//! and the user-facing enable flag. They are read at the start of every
//! check, so edits from outside the process take effect on the next cycle.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UpdateError;

/// Capability interface over the persisted keys. Read and write failures
/// propagate to the calling operation.
pub trait StateStore {
    fn next_check_at(&self) -> Result<Option<DateTime<Utc>>, UpdateError>;
    fn set_next_check_at(&mut self, at: DateTime<Utc>) -> Result<(), UpdateError>;
    fn last_release_at(&self) -> Result<Option<DateTime<Utc>>, UpdateError>;
    fn set_last_release_at(&mut self, at: DateTime<Utc>) -> Result<(), UpdateError>;
    fn check_enabled(&self) -> Result<bool, UpdateError>;
    fn set_check_enabled(&mut self, enabled: bool) -> Result<(), UpdateError>;
}

/// On-disk JSON document backing [`FileStateStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    next_check_at: Option<DateTime<Utc>>,
    #[serde(default)]
    last_release_at: Option<DateTime<Utc>>,
    #[serde(default = "default_check_enabled")]
    check_enabled: bool,
}

fn default_check_enabled() -> bool {
    true
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            next_check_at: None,
            last_release_at: None,
            check_enabled: true,
        }
    }
}

/// State store persisted as a single JSON file.
///
/// A missing file behaves like stock state; a corrupt file is an error,
/// not a silent reset.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<StateDocument, UpdateError> {
        if !self.path.exists() {
            return Ok(StateDocument::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, doc: &StateDocument) -> Result<(), UpdateError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn update(
        &mut self,
        mutate: impl FnOnce(&mut StateDocument),
    ) -> Result<(), UpdateError> {
        let mut doc = self.load()?;
        mutate(&mut doc);
        self.save(&doc)
    }
}

impl StateStore for FileStateStore {
    fn next_check_at(&self) -> Result<Option<DateTime<Utc>>, UpdateError> {
        Ok(self.load()?.next_check_at)
    }

    fn set_next_check_at(&mut self, at: DateTime<Utc>) -> Result<(), UpdateError> {
        self.update(|doc| doc.next_check_at = Some(at))
    }

    fn last_release_at(&self) -> Result<Option<DateTime<Utc>>, UpdateError> {
        Ok(self.load()?.last_release_at)
    }

    fn set_last_release_at(&mut self, at: DateTime<Utc>) -> Result<(), UpdateError> {
        self.update(|doc| doc.last_release_at = Some(at))
    }

    fn check_enabled(&self) -> Result<bool, UpdateError> {
        Ok(self.load()?.check_enabled)
    }

    fn set_check_enabled(&mut self, enabled: bool) -> Result<(), UpdateError> {
        self.update(|doc| doc.check_enabled = enabled)
    }
}

/// In-memory store for deterministic tests and ephemeral setups.
#[derive(Debug, Clone)]
pub struct MemoryStateStore {
    next_check_at: Option<DateTime<Utc>>,
    last_release_at: Option<DateTime<Utc>>,
    check_enabled: bool,
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self {
            next_check_at: None,
            last_release_at: None,
            check_enabled: true,
        }
    }
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_next_check_at(mut self, at: DateTime<Utc>) -> Self {
        self.next_check_at = Some(at);
        self
    }

    pub fn with_last_release_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_release_at = Some(at);
        self
    }

    pub fn with_check_enabled(mut self, enabled: bool) -> Self {
        self.check_enabled = enabled;
        self
    }
}

impl StateStore for MemoryStateStore {
    fn next_check_at(&self) -> Result<Option<DateTime<Utc>>, UpdateError> {
        Ok(self.next_check_at)
    }

    fn set_next_check_at(&mut self, at: DateTime<Utc>) -> Result<(), UpdateError> {
        self.next_check_at = Some(at);
        Ok(())
    }

    fn last_release_at(&self) -> Result<Option<DateTime<Utc>>, UpdateError> {
        Ok(self.last_release_at)
    }

    fn set_last_release_at(&mut self, at: DateTime<Utc>) -> Result<(), UpdateError> {
        self.last_release_at = Some(at);
        Ok(())
    }

    fn check_enabled(&self) -> Result<bool, UpdateError> {
        Ok(self.check_enabled)
    }

    fn set_check_enabled(&mut self, enabled: bool) -> Result<(), UpdateError> {
        self.check_enabled = enabled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::with_path(temp.path().join("update_state.json"));

        assert!(store.next_check_at().unwrap().is_none());
        assert!(store.last_release_at().unwrap().is_none());
        assert!(store.check_enabled().unwrap());
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state/update_state.json");

        let mut store = FileStateStore::with_path(&path);
        store.set_next_check_at(instant()).unwrap();
        store.set_last_release_at(instant()).unwrap();
        store.set_check_enabled(false).unwrap();

        let reopened = FileStateStore::with_path(&path);
        assert_eq!(reopened.next_check_at().unwrap(), Some(instant()));
        assert_eq!(reopened.last_release_at().unwrap(), Some(instant()));
        assert!(!reopened.check_enabled().unwrap());
    }

    #[test]
    fn test_partial_writes_preserve_other_keys() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStateStore::with_path(temp.path().join("update_state.json"));

        store.set_last_release_at(instant()).unwrap();
        store.set_check_enabled(false).unwrap();

        assert_eq!(store.last_release_at().unwrap(), Some(instant()));
        assert!(store.next_check_at().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("update_state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStateStore::with_path(&path);
        assert!(matches!(
            store.check_enabled(),
            Err(UpdateError::StoreFormat(_))
        ));
    }
}
