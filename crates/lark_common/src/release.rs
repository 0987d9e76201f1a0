//! Release feed data model.
//!
//! Mirrors the fields of the GitHub releases API that the update subsystem
//! consumes. Everything else in the wire payload is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::version::{Version, VersionParseError};

/// Release stream being polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseChannel {
    Stable,
    #[default]
    Nightly,
}

impl ReleaseChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseChannel::Stable => "stable",
            ReleaseChannel::Nightly => "nightly",
        }
    }

    /// GitHub repository publishing this channel.
    pub fn repo(&self) -> &'static str {
        match self {
            ReleaseChannel::Stable => "lark-app/lark",
            ReleaseChannel::Nightly => "lark-app/lark-nightly",
        }
    }
}

/// A published build on the polled channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    /// Release notes. GitHub sends null for an empty body.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub prerelease: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    pub browser_download_url: String,
    pub content_type: String,
    pub size: u64,
}

impl Release {
    /// Version parsed from the tag name.
    pub fn version(&self) -> Result<Version, VersionParseError> {
        self.tag_name.parse()
    }

    /// First asset of the given content type, in list order.
    pub fn installable_asset(&self, content_type: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| a.content_type == content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_repo_mapping() {
        assert_eq!(ReleaseChannel::Stable.repo(), "lark-app/lark");
        assert_eq!(ReleaseChannel::Nightly.repo(), "lark-app/lark-nightly");
        assert_eq!(ReleaseChannel::default().as_str(), "nightly");
    }

    #[test]
    fn test_deserialize_release_payload() {
        let payload = r#"{
            "id": 9001,
            "tag_name": "v0.4.3-nightly.20250302",
            "body": "Nightly build",
            "prerelease": true,
            "created_at": "2025-03-02T04:15:00Z",
            "assets": [
                {
                    "id": 1,
                    "name": "lark-0.4.3.tar.gz",
                    "browser_download_url": "https://example.invalid/lark-0.4.3.tar.gz",
                    "content_type": "application/gzip",
                    "size": 123456
                },
                {
                    "id": 2,
                    "name": "lark-0.4.3",
                    "browser_download_url": "https://example.invalid/lark-0.4.3",
                    "content_type": "application/octet-stream",
                    "size": 654321
                }
            ]
        }"#;

        let release: Release = serde_json::from_str(payload).unwrap();
        assert_eq!(release.tag_name, "v0.4.3-nightly.20250302");
        assert!(release.prerelease);
        assert_eq!(release.assets.len(), 2);
        assert_eq!(release.version().unwrap().to_string(), "0.4.3-nightly.20250302");

        let asset = release.installable_asset("application/octet-stream").unwrap();
        assert_eq!(asset.id, 2);
    }

    #[test]
    fn test_deserialize_defaults_missing_fields() {
        let payload = r#"{
            "id": 1,
            "tag_name": "v0.4.0",
            "created_at": "2025-01-10T00:00:00Z"
        }"#;

        let release: Release = serde_json::from_str(payload).unwrap();
        assert_eq!(release.body, "");
        assert!(!release.prerelease);
        assert!(release.assets.is_empty());
    }

    #[test]
    fn test_installable_asset_picks_first_match() {
        let asset = |id, content_type: &str| ReleaseAsset {
            id,
            name: format!("asset-{id}"),
            browser_download_url: format!("https://example.invalid/{id}"),
            content_type: content_type.to_string(),
            size: 10,
        };
        let release = Release {
            id: 1,
            tag_name: "v1.0.0".to_string(),
            body: String::new(),
            prerelease: false,
            created_at: Utc::now(),
            assets: vec![
                asset(1, "text/plain"),
                asset(2, "application/octet-stream"),
                asset(3, "application/octet-stream"),
            ],
        };

        assert_eq!(release.installable_asset("application/octet-stream").unwrap().id, 2);
        assert!(release.installable_asset("application/zip").is_none());
    }
}
