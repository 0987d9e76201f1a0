//! Error types for the update subsystem.

use thiserror::Error;

use crate::version::VersionParseError;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("release feed request failed: {0}")]
    Feed(#[from] reqwest::Error),

    #[error("release feed returned HTTP {0}")]
    FeedStatus(u16),

    #[error(transparent)]
    Version(#[from] VersionParseError),

    #[error("state store I/O error: {0}")]
    Store(#[from] std::io::Error),

    #[error("state store corrupt: {0}")]
    StoreFormat(#[from] serde_json::Error),
}
