//! Release feed access.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::UpdateError;
use crate::release::{Release, ReleaseChannel};

/// Fetches the single most recent release for a channel.
#[async_trait]
pub trait ReleaseSource {
    async fn fetch_latest(&self, channel: ReleaseChannel) -> Result<Release, UpdateError>;
}

/// GitHub releases API endpoint for a channel's most recent release.
pub fn latest_release_url(channel: ReleaseChannel) -> String {
    format!(
        "https://api.github.com/repos/{}/releases/latest",
        channel.repo()
    )
}

/// Release source backed by the GitHub releases API.
pub struct GitHubReleaseSource {
    client: reqwest::Client,
}

impl GitHubReleaseSource {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(format!("lark/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for GitHubReleaseSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleaseSource {
    async fn fetch_latest(&self, channel: ReleaseChannel) -> Result<Release, UpdateError> {
        let url = latest_release_url(channel);
        debug!("fetching latest {} release from {url}", channel.as_str());

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpdateError::FeedStatus(response.status().as_u16()));
        }

        Ok(response.json::<Release>().await?)
    }
}
