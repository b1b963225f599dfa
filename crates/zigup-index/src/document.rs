//! Parsed release indexes.
//!
//! Both indexes share one schema: a top-level JSON object keyed by release
//! name (a version or a channel like `master`), each value carrying a
//! `date`, optionally a `version` (when the key is a channel name), and
//! per-platform objects with a `tarball` URL.

use serde::Deserialize;
use std::collections::BTreeMap;
use zigup_core::ZigVersion;

/// One release in an index.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseEntry {
    /// Release date, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Concrete version when the key is a channel name.
    pub version: Option<String>,
    /// Everything else: per-platform objects, notes, doc links.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ReleaseEntry {
    /// The tarball URL for a platform token like `x86_64-linux`.
    pub fn tarball(&self, platform: &str) -> Option<&str> {
        self.extra.get(platform)?.get("tarball")?.as_str()
    }
}

/// A parsed release index.
///
/// Keys are held in a BTreeMap so iteration order is deterministic and
/// independent of the JSON object order.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct IndexDocument {
    pub releases: BTreeMap<String, ReleaseEntry>,
}

impl IndexDocument {
    /// Parse an index from its JSON text.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a release by key.
    pub fn get(&self, key: &str) -> Option<&ReleaseEntry> {
        self.releases.get(key)
    }

    /// Number of releases listed.
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// The highest non-prerelease version keyed directly by version string.
    ///
    /// Channel keys (anything that does not parse as a version) are
    /// skipped. On equal maxima the entry seen first wins.
    pub fn latest_stable(&self) -> Option<(&str, &ReleaseEntry)> {
        let mut best: Option<(ZigVersion, &str, &ReleaseEntry)> = None;
        for (key, entry) in &self.releases {
            let Ok(version) = key.parse::<ZigVersion>() else {
                continue;
            };
            if version.is_prerelease() {
                continue;
            }
            match best {
                Some((ref held, _, _)) if version <= *held => {}
                _ => best = Some((version, key.as_str(), entry)),
            }
        }
        best.map(|(_, key, entry)| (key, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "master": {
            "version": "0.14.0-dev.121+ab3c1f2d9",
            "date": "2024-06-01",
            "x86_64-linux": {
                "tarball": "https://ziglang.org/builds/zig-linux-x86_64-0.14.0-dev.121+ab3c1f2d9.tar.xz",
                "shasum": "0000",
                "size": "1"
            }
        },
        "0.13.0": {
            "date": "2024-06-07",
            "notes": "https://ziglang.org/download/0.13.0/release-notes.html",
            "x86_64-linux": {
                "tarball": "https://ziglang.org/download/0.13.0/zig-linux-x86_64-0.13.0.tar.xz",
                "shasum": "1111",
                "size": "2"
            },
            "aarch64-macos": {
                "tarball": "https://ziglang.org/download/0.13.0/zig-macos-aarch64-0.13.0.tar.xz",
                "shasum": "2222",
                "size": "3"
            }
        },
        "0.12.0": {
            "date": "2024-04-20",
            "x86_64-linux": { "tarball": "https://ziglang.org/download/0.12.0/zig-linux-x86_64-0.12.0.tar.xz" }
        },
        "0.14.0-dev.5+deadbeef": {
            "date": "2024-05-30",
            "x86_64-linux": { "tarball": "https://ziglang.org/builds/zig-linux-x86_64-0.14.0-dev.5+deadbeef.tar.xz" }
        }
    }"#;

    #[test]
    fn test_parse_and_lookup() {
        let doc = IndexDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.len(), 4);

        let entry = doc.get("0.13.0").unwrap();
        assert_eq!(entry.date.as_deref(), Some("2024-06-07"));
        assert!(entry.version.is_none());
        assert_eq!(
            entry.tarball("x86_64-linux"),
            Some("https://ziglang.org/download/0.13.0/zig-linux-x86_64-0.13.0.tar.xz")
        );
        assert_eq!(entry.tarball("riscv64-linux"), None);
    }

    #[test]
    fn test_channel_entry_carries_version() {
        let doc = IndexDocument::parse(SAMPLE).unwrap();
        let master = doc.get("master").unwrap();
        assert_eq!(master.version.as_deref(), Some("0.14.0-dev.121+ab3c1f2d9"));
    }

    #[test]
    fn test_non_platform_fields_are_not_tarballs() {
        let doc = IndexDocument::parse(SAMPLE).unwrap();
        let entry = doc.get("0.13.0").unwrap();
        // "notes" is a plain string, not a platform object.
        assert_eq!(entry.tarball("notes"), None);
    }

    #[test]
    fn test_latest_stable_skips_channels_and_prereleases() {
        let doc = IndexDocument::parse(SAMPLE).unwrap();
        let (key, _) = doc.latest_stable().unwrap();
        assert_eq!(key, "0.13.0");
    }

    #[test]
    fn test_latest_stable_on_empty_index() {
        let doc = IndexDocument::parse("{}").unwrap();
        assert!(doc.latest_stable().is_none());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(IndexDocument::parse("[1, 2]").is_err());
        assert!(IndexDocument::parse("not json").is_err());
    }
}
