//! Update subsystem configuration.
//!
//! Loaded from TOML. Every field has a default, so a missing or partial
//! file behaves like stock settings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::release::ReleaseChannel;

/// Content type that marks a release asset as installable by default.
pub const DEFAULT_ARTIFACT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Whether scheduled update checks run at all.
    #[serde(default = "default_check_for_updates")]
    pub check_for_updates: bool,

    /// Release stream to poll.
    #[serde(default)]
    pub channel: ReleaseChannel,

    /// Content type of the installable artifact for this platform.
    #[serde(default = "default_artifact_content_type")]
    pub artifact_content_type: String,
}

fn default_check_for_updates() -> bool {
    true
}

fn default_artifact_content_type() -> String {
    DEFAULT_ARTIFACT_CONTENT_TYPE.to_string()
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            check_for_updates: true,
            channel: ReleaseChannel::default(),
            artifact_content_type: default_artifact_content_type(),
        }
    }
}

impl UpdateConfig {
    /// Load from a TOML file. A missing file yields defaults; an invalid
    /// one is logged and ignored rather than taking the daemon down.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };

        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }
}
