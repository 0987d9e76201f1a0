//! Pending update notice.
//!
//! When the scheduler detects an installable update it records the
//! descriptor here, so UI surfaces and the feedback subcommands can act on
//! it after the process that found it is gone.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lark_common::AppUpdate;
use serde::{Deserialize, Serialize};

const NOTICE_FILE: &str = "pending_update.json";

/// A detected update awaiting caller feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingNotice {
    pub update: AppUpdate,
    pub noticed_at: DateTime<Utc>,
}

impl PendingNotice {
    fn path(state_dir: &Path) -> PathBuf {
        state_dir.join(NOTICE_FILE)
    }

    /// Record a freshly detected update, replacing any earlier notice.
    pub fn record(state_dir: &Path, update: &AppUpdate) -> Result<()> {
        let notice = Self {
            update: update.clone(),
            noticed_at: Utc::now(),
        };
        let path = Self::path(state_dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create state directory")?;
        }
        let content = serde_json::to_string_pretty(&notice)?;
        fs::write(&path, content).context("Failed to write pending update notice")?;
        Ok(())
    }

    pub fn load(state_dir: &Path) -> Result<Option<Self>> {
        let path = Self::path(state_dir);
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&path).context("Failed to read pending update notice")?;
        let notice =
            serde_json::from_str(&content).context("Failed to parse pending update notice")?;
        Ok(Some(notice))
    }

    pub fn remove(state_dir: &Path) -> Result<()> {
        let path = Self::path(state_dir);
        if path.exists() {
            fs::remove_file(&path).context("Failed to remove pending update notice")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lark_common::UpdateKind;
    use tempfile::TempDir;

    fn update() -> AppUpdate {
        AppUpdate {
            kind: UpdateKind::ScheduledChannelUpdate,
            artifact_id: 11,
            artifact_url: "https://example.invalid/assets/11".to_string(),
            size: 2048,
            version: "0.5.0-nightly.2".parse().unwrap(),
            release_notes: "notes".to_string(),
            release_date: Utc.with_ymd_and_hms(2025, 3, 4, 2, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_notice_roundtrip() {
        let temp = TempDir::new().unwrap();

        assert!(PendingNotice::load(temp.path()).unwrap().is_none());

        PendingNotice::record(temp.path(), &update()).unwrap();
        let loaded = PendingNotice::load(temp.path()).unwrap().unwrap();
        assert_eq!(loaded.update, update());

        PendingNotice::remove(temp.path()).unwrap();
        assert!(PendingNotice::load(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_remove_without_notice_is_ok() {
        let temp = TempDir::new().unwrap();
        PendingNotice::remove(temp.path()).unwrap();
    }
}
