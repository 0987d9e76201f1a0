//! Release version tags.
//!
//! Tags look like `v0.4.2` or `v0.4.2-nightly.20250301`; the leading `v` is
//! optional. Parsing is strict: a tag without a numeric version core is
//! rejected instead of defaulting to zero.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parsed release version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// Pre-release suffix after `-`, e.g. `nightly.20250301`.
    pub pre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version tag {tag:?}: {reason}")]
pub struct VersionParseError {
    pub tag: String,
    pub reason: &'static str,
}

impl VersionParseError {
    fn new(tag: &str, reason: &'static str) -> Self {
        Self {
            tag: tag.to_string(),
            reason,
        }
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(VersionParseError::new(s, "empty tag"));
        }

        let stripped = raw.strip_prefix('v').unwrap_or(raw);
        let (core, pre) = match stripped.split_once('-') {
            Some((_, "")) => return Err(VersionParseError::new(s, "empty pre-release suffix")),
            Some((core, pre)) => (core, Some(pre.to_string())),
            None => (stripped, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(VersionParseError::new(s, "expected major.minor[.patch]"));
        }

        let mut nums = [0u32; 3];
        for (i, part) in parts.iter().enumerate() {
            nums[i] = part
                .parse()
                .map_err(|_| VersionParseError::new(s, "non-numeric version component"))?;
        }

        Ok(Version {
            major: nums[0],
            minor: nums[1],
            patch: nums[2],
            pre,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            // A pre-release sorts before the bare release of the same triple.
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
