//! Scheduled update checks.
//!
//! The loop wakes up once a minute; the daily cadence between actual feed
//! queries is enforced by the checker's persisted schedule, so a cheap
//! wakeup here only serves to pick up config changes quickly.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use lark_common::{
    FileStateStore, GitHubReleaseSource, SystemClock, UpdateChecker, UpdateConfig,
};
use tracing::{debug, error, info};

use crate::notice::PendingNotice;

const CYCLE: Duration = Duration::from_secs(60);

/// Schedule state file under the state directory.
const STATE_FILE: &str = "update_state.json";

type Checker = UpdateChecker<GitHubReleaseSource, FileStateStore, SystemClock>;

fn build_checker(config: &UpdateConfig, state_dir: &Path) -> Checker {
    let store = FileStateStore::with_path(state_dir.join(STATE_FILE));
    UpdateChecker::new(
        GitHubReleaseSource::new(),
        store,
        SystemClock,
        config.channel,
        config.artifact_content_type.clone(),
    )
}

/// Reload config and rebuild the checker, mirroring the configured enable
/// flag into the persisted state so runtime edits apply without restart.
fn checker_from_config(config_path: &Path, state_dir: &Path) -> Result<Checker> {
    let config = UpdateConfig::load(config_path);
    let mut checker = build_checker(&config, state_dir);
    if checker.check_enabled()? != config.check_for_updates {
        checker
            .set_check_enabled(config.check_for_updates)
            .context("Failed to persist update enable flag")?;
    }
    Ok(checker)
}

async fn run_cycle(config_path: &Path, state_dir: &Path) {
    let mut checker = match checker_from_config(config_path, state_dir) {
        Ok(checker) => checker,
        Err(e) => {
            error!("update state unavailable: {e:#}");
            return;
        }
    };

    match checker.check_for_update().await {
        Ok(Some(update)) => {
            info!("update available: v{} ({} bytes)", update.version, update.size);
            if let Err(e) = PendingNotice::record(state_dir, &update) {
                error!("failed to record pending update: {e:#}");
            }
        }
        Ok(None) => debug!("no update available"),
        Err(e) => error!("update check failed: {e}"),
    }
}

/// Run the check loop until the process is stopped.
pub async fn run(config_path: &Path, state_dir: &Path) -> Result<()> {
    info!("update scheduler started");

    loop {
        run_cycle(config_path, state_dir).await;

        tokio::select! {
            _ = tokio::time::sleep(CYCLE) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down gracefully");
                return Ok(());
            }
        }
    }
}

/// Perform one check cycle now, honoring the persisted schedule.
pub async fn check_once(config_path: &Path, state_dir: &Path) -> Result<()> {
    let mut checker = checker_from_config(config_path, state_dir)?;

    match checker.check_for_update().await? {
        Some(update) => {
            info!("update available: v{} ({})", update.version, update.artifact_url);
            PendingNotice::record(state_dir, &update)?;
        }
        None => info!("no update available"),
    }
    Ok(())
}

/// Postpone the pending update; the next check becomes due in a day.
pub fn skip_pending(config_path: &Path, state_dir: &Path) -> Result<()> {
    let mut checker = checker_from_config(config_path, state_dir)?;

    let notice = PendingNotice::load(state_dir)?.context("No pending update to skip")?;
    checker.skip_update(&notice.update)?;
    PendingNotice::remove(state_dir)?;

    info!("postponed update v{}", notice.update.version);
    Ok(())
}

/// Record that the pending update was downloaded, advancing the baseline.
pub fn mark_downloaded(config_path: &Path, state_dir: &Path) -> Result<()> {
    let mut checker = checker_from_config(config_path, state_dir)?;

    let notice =
        PendingNotice::load(state_dir)?.context("No pending update to mark downloaded")?;
    checker.update_downloaded(&notice.update)?;
    PendingNotice::remove(state_dir)?;

    info!("recorded downloaded update v{}", notice.update.version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_checker_from_config_mirrors_enable_flag() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(&config_path, "check_for_updates = false\n").unwrap();

        let checker = checker_from_config(&config_path, temp.path()).unwrap();
        assert!(!checker.check_enabled().unwrap());

        std::fs::write(&config_path, "check_for_updates = true\n").unwrap();
        let checker = checker_from_config(&config_path, temp.path()).unwrap();
        assert!(checker.check_enabled().unwrap());
    }
}
