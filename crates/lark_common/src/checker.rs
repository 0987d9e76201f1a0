//! Update availability decision core.
//!
//! Decides when the release feed may be queried, whether a fetched release
//! is newer than the acknowledged baseline, and which asset is installable
//! here. All scheduling state lives in the injected [`StateStore`], so the
//! decisions hold across process restarts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::UpdateError;
use crate::release::{Release, ReleaseChannel};
use crate::source::ReleaseSource;
use crate::store::StateStore;
use crate::version::Version;

/// Hours between permitted feed checks once a schedule exists.
pub const CHECK_BACKOFF_HOURS: i64 = 24;

/// How an update was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateKind {
    ScheduledChannelUpdate,
}

/// A newer installable build detected on the polled channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppUpdate {
    pub kind: UpdateKind,
    pub artifact_id: u64,
    pub artifact_url: String,
    pub size: u64,
    pub version: Version,
    pub release_notes: String,
    pub release_date: DateTime<Utc>,
}

/// Polls a release channel and reports installable updates.
///
/// Methods take `&mut self`; overlapping calls cannot race on the store
/// because a caller must own the checker exclusively to drive it.
pub struct UpdateChecker<S, K, C> {
    source: S,
    store: K,
    clock: C,
    channel: ReleaseChannel,
    artifact_content_type: String,
}

impl<S, K, C> UpdateChecker<S, K, C>
where
    S: ReleaseSource,
    K: StateStore,
    C: Clock,
{
    pub fn new(
        source: S,
        store: K,
        clock: C,
        channel: ReleaseChannel,
        artifact_content_type: impl Into<String>,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            channel,
            artifact_content_type: artifact_content_type.into(),
        }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn check_enabled(&self) -> Result<bool, UpdateError> {
        self.store.check_enabled()
    }

    pub fn set_check_enabled(&mut self, enabled: bool) -> Result<(), UpdateError> {
        self.store.set_check_enabled(enabled)
    }

    /// Check the channel for an installable update.
    ///
    /// Yields `None` when checks are disabled, the schedule is not due yet,
    /// the feed has nothing newer than the baseline, or the newer release
    /// carries no asset of the expected content type. Feed and store
    /// failures propagate without mutating any state.
    pub async fn check_for_update(&mut self) -> Result<Option<AppUpdate>, UpdateError> {
        if !self.store.check_enabled()? {
            debug!("update checks disabled");
            return Ok(None);
        }
        if !self.check_due()? {
            debug!("next update check not due yet");
            return Ok(None);
        }

        let release = self.source.fetch_latest(self.channel).await?;

        if !self.release_is_newer(&release)? {
            debug!("release {} is not newer than baseline", release.tag_name);
            return Ok(None);
        }

        let Some(asset) = release.installable_asset(&self.artifact_content_type) else {
            info!(
                "release {} is newer but has no {} asset",
                release.tag_name, self.artifact_content_type
            );
            return Ok(None);
        };

        let version = release.version()?;
        info!("update available: v{version} ({} bytes)", asset.size);

        Ok(Some(AppUpdate {
            kind: UpdateKind::ScheduledChannelUpdate,
            artifact_id: asset.id,
            artifact_url: asset.browser_download_url.clone(),
            size: asset.size,
            version,
            release_notes: release.body.clone(),
            release_date: release.created_at,
        }))
    }

    /// Postpone the reported update. The same release is reported again
    /// once the next check becomes due, since the baseline is untouched.
    pub fn skip_update(&mut self, update: &AppUpdate) -> Result<(), UpdateError> {
        debug!("skipping update v{}", update.version);
        self.schedule_next_check()
    }

    /// Record that the reported update was downloaded.
    ///
    /// Installation is not observable, so the baseline moves forward on the
    /// assumption that the downloaded build will be installed. A stale
    /// acknowledgement never drags the baseline backwards.
    pub fn update_downloaded(&mut self, update: &AppUpdate) -> Result<(), UpdateError> {
        match self.store.last_release_at()? {
            Some(baseline) if update.release_date <= baseline => {
                debug!("ignoring stale download acknowledgement v{}", update.version);
                Ok(())
            }
            _ => self.store.set_last_release_at(update.release_date),
        }
    }

    /// A check is due when no schedule exists, or the current time strictly
    /// exceeds the scheduled instant.
    fn check_due(&self) -> Result<bool, UpdateError> {
        match self.store.next_check_at()? {
            Some(next) => Ok(self.clock.now() > next),
            None => Ok(true),
        }
    }

    /// Compare a fetched release against the baseline, adopting it as the
    /// baseline on the first ever successful check. There is nothing to
    /// compare the first release against, so it is never reported.
    fn release_is_newer(&mut self, release: &Release) -> Result<bool, UpdateError> {
        let Some(baseline) = self.store.last_release_at()? else {
            info!(
                "first update check, recording baseline {}",
                release.created_at
            );
            self.store.set_last_release_at(release.created_at)?;
            self.schedule_next_check()?;
            return Ok(false);
        };

        Ok(release.created_at > baseline)
    }

    fn schedule_next_check(&mut self) -> Result<(), UpdateError> {
        let next = self.clock.now() + Duration::hours(CHECK_BACKOFF_HOURS);
        self.store.set_next_check_at(next)
    }
}
