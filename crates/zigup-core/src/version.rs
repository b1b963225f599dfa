//! Zig version parsing and comparison.
//!
//! Zig releases are plain semver (`0.13.0`); development builds carry a
//! pre-release and build part (`0.13.0-dev.351+d0cd54c64`). Ordering follows
//! semver: the pre-release sorts below its release, and numeric pre-release
//! identifiers compare numerically.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed Zig version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZigVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// Pre-release part after `-`, e.g. `dev.351`.
    pub pre: Option<String>,
    /// Build metadata after `+`, e.g. `d0cd54c64`. Ignored for ordering.
    pub build: Option<String>,
}

impl ZigVersion {
    /// Create a release version (no pre-release, no build metadata).
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
            build: None,
        }
    }

    /// A version with a pre-release part is a development build.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }
}

impl fmt::Display for ZigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.pre {
            write!(f, "-{}", pre)?;
        }
        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

impl FromStr for ZigVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionParseError::InvalidFormat(s.to_string()));
        }

        // Split off build metadata first, then the pre-release part.
        let (rest, build) = match s.split_once('+') {
            Some((r, b)) => (r, Some(b.to_string())),
            None => (s, None),
        };
        let (version_part, pre) = match rest.split_once('-') {
            Some((v, p)) if !p.is_empty() => (v, Some(p.to_string())),
            Some(_) => return Err(VersionParseError::InvalidFormat(s.to_string())),
            None => (rest, None),
        };

        let parts: Vec<&str> = version_part.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionParseError::InvalidFormat(s.to_string()));
        }

        let number = |p: &str| {
            p.parse::<u32>()
                .map_err(|_| VersionParseError::InvalidNumber(p.to_string()))
        };

        Ok(ZigVersion {
            major: number(parts[0])?,
            minor: number(parts[1])?,
            patch: number(parts[2])?,
            pre,
            build,
        })
    }
}

impl PartialOrd for ZigVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ZigVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.major.cmp(&other.major) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.minor.cmp(&other.minor) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.patch.cmp(&other.patch) {
            Ordering::Equal => {}
            ord => return ord,
        }
        // Pre-release versions are less than release versions.
        match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => compare_prerelease(a, b),
        }
    }
}

/// Semver pre-release comparison: dot-separated identifiers, numeric
/// identifiers compare numerically and rank below alphanumeric ones.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(nx), Ok(ny)) => nx.cmp(&ny),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Error parsing a version string.
#[derive(Debug, thiserror::Error)]
pub enum VersionParseError {
    #[error("invalid version format: {0}")]
    InvalidFormat(String),
    #[error("invalid version number: {0}")]
    InvalidNumber(String),
}
