//! Mapping a version spec to a concrete release.
//!
//! Resolution is lazy: nothing touches the network until the first getter
//! call, and one internal attempt populates id, url, and date together. A
//! failed attempt is sticky. The one partial outcome is a release without a
//! date (development builds, installed-only specs): `id()`/`url()` succeed
//! while `date()` reports [`ResolveError::NoDate`].

use crate::layout::{ID_PREFIX, InstallLayout};
use crate::platform::HostPlatform;
use crate::versions::VersionSpec;
use tracing::debug;
use zigup_core::{Error, ZigVersion};
use zigup_index::{CachePolicy, IndexDocument, IndexKind, IndexStore, ReleaseEntry};

/// Resolution failure. Cloneable so the memoized failure can be returned
/// from every later getter call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown version '{0}'")]
    InvalidVersion(String),

    #[error("release index is malformed: {0}")]
    InvalidIndexJson(String),

    #[error("unsupported system: {0}")]
    UnsupportedSystem(String),

    #[error("no Zig versions are installed")]
    NoInstalledVersions,

    #[error("failed to scan installed versions: {0}")]
    FailedInstallSearch(String),

    /// Internal-only: the release resolved without a date.
    #[error("release has no date")]
    NoDate,

    #[error("{0}")]
    Index(String),
}

impl From<zigup_index::IndexError> for ResolveError {
    fn from(e: zigup_index::IndexError) -> Self {
        ResolveError::Index(e.to_string())
    }
}

impl From<ResolveError> for Error {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::InvalidVersion(spec) => Error::InvalidVersion { spec },
            ResolveError::NoInstalledVersions => Error::NoInstalledVersions {
                fixes: vec![zigup_core::Fix::with_command(
                    "install a Zig toolchain first",
                    "zigup stable",
                )],
            },
            other => Error::Other(anyhow::anyhow!(other)),
        }
    }
}

/// A fully resolved release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    /// Install id, `zig-<version>`.
    pub id: String,
    /// Absolute archive URL.
    pub url: String,
    /// Release date, absent for development builds and installed-only specs.
    pub date: Option<String>,
}

/// Resolves one version spec against the indexes and the install dir.
pub struct VersionResolver<'a> {
    spec: VersionSpec,
    store: &'a mut IndexStore,
    layout: &'a InstallLayout,
    record: Option<ReleaseRecord>,
    failure: Option<ResolveError>,
}

impl<'a> VersionResolver<'a> {
    pub fn new(spec: VersionSpec, store: &'a mut IndexStore, layout: &'a InstallLayout) -> Self {
        Self {
            spec,
            store,
            layout,
            record: None,
            failure: None,
        }
    }

    /// The spec being resolved.
    pub fn spec(&self) -> &VersionSpec {
        &self.spec
    }

    /// The install id, `zig-<version>`.
    pub async fn id(&mut self) -> Result<&str, ResolveError> {
        self.ensure_resolved().await?;
        Ok(&self.record.as_ref().unwrap().id)
    }

    /// The archive URL.
    pub async fn url(&mut self) -> Result<&str, ResolveError> {
        self.ensure_resolved().await?;
        Ok(&self.record.as_ref().unwrap().url)
    }

    /// The release date. Fails with [`ResolveError::NoDate`] when the
    /// release resolved without one.
    pub async fn date(&mut self) -> Result<&str, ResolveError> {
        self.ensure_resolved().await?;
        self.record
            .as_ref()
            .unwrap()
            .date
            .as_deref()
            .ok_or(ResolveError::NoDate)
    }

    /// The full record, for callers that want all three at once.
    pub async fn record(&mut self) -> Result<&ReleaseRecord, ResolveError> {
        self.ensure_resolved().await?;
        Ok(self.record.as_ref().unwrap())
    }

    async fn ensure_resolved(&mut self) -> Result<(), ResolveError> {
        if let Some(ref failure) = self.failure {
            return Err(failure.clone());
        }
        if self.record.is_some() {
            return Ok(());
        }
        match self.resolve_once().await {
            Ok(record) => {
                debug!(id = %record.id, "Resolved {}", self.spec);
                self.record = Some(record);
                Ok(())
            }
            Err(e) => {
                self.failure = Some(e.clone());
                Err(e)
            }
        }
    }

    async fn resolve_once(&mut self) -> Result<ReleaseRecord, ResolveError> {
        let platform = HostPlatform::current()
            .map_err(|e| ResolveError::UnsupportedSystem(e.to_string()))?;

        match self.spec.clone() {
            VersionSpec::Stable => {
                let doc = self.store.get(IndexKind::Zig, CachePolicy::NeverCache).await?;
                let (key, entry) = doc
                    .latest_stable()
                    .ok_or_else(|| ResolveError::InvalidIndexJson("no stable release".into()))?;
                record_from_entry(&format!("{ID_PREFIX}{key}"), entry, &platform)
            }
            VersionSpec::Master => {
                let doc = self.store.get(IndexKind::Zig, CachePolicy::NeverCache).await?;
                channel_record(doc, "master", &platform)
            }
            VersionSpec::MachLatest => {
                let doc = self.store.get(IndexKind::Mach, CachePolicy::NeverCache).await?;
                channel_record(doc, "mach-latest", &platform)
            }
            VersionSpec::Mach(raw) => {
                self.keyed_record(IndexKind::Mach, &raw, &platform).await
            }
            VersionSpec::Tagged(version) => {
                self.keyed_record(IndexKind::Zig, &version.to_string(), &platform)
                    .await
            }
            VersionSpec::Dev(version) => {
                let raw = version.to_string();
                Ok(ReleaseRecord {
                    id: format!("{ID_PREFIX}{raw}"),
                    url: platform.dev_build_url(&raw),
                    date: None,
                })
            }
            VersionSpec::LatestInstalled => {
                let (id, version) = self.best_installed(false)?;
                Ok(ReleaseRecord {
                    url: platform.dev_build_url(&version.to_string()),
                    id,
                    date: None,
                })
            }
            VersionSpec::StableInstalled => {
                let (id, version) = self.best_installed(true)?;
                let key = version.to_string();
                let doc = self
                    .store
                    .get(IndexKind::Zig, CachePolicy::AlwaysCache)
                    .await?;
                match doc.get(&key) {
                    Some(entry) => record_from_entry(&id, entry, &platform),
                    // Installed but no longer listed; the install itself is
                    // still authoritative.
                    None => Ok(ReleaseRecord {
                        url: platform.dev_build_url(&key),
                        id,
                        date: None,
                    }),
                }
            }
        }
    }

    /// Look up an index key, refreshing a stale cache once before giving up.
    async fn keyed_record(
        &mut self,
        kind: IndexKind,
        key: &str,
        platform: &HostPlatform,
    ) -> Result<ReleaseRecord, ResolveError> {
        let doc = self.store.get(kind, CachePolicy::TryCache).await?;
        if doc.get(key).is_none() {
            debug!("'{}' not in cached {} index, refreshing", key, kind);
            self.store.refresh(kind).await?;
        }
        let doc = self.store.get(kind, CachePolicy::TryCache).await?;
        let entry = doc
            .get(key)
            .ok_or_else(|| ResolveError::InvalidVersion(key.to_string()))?;
        let version = entry.version.as_deref().unwrap_or(key);
        record_from_entry(&format!("{ID_PREFIX}{version}"), entry, platform)
    }

    /// Highest installed version, optionally restricted to releases.
    fn best_installed(&self, stable_only: bool) -> Result<(String, ZigVersion), ResolveError> {
        let ids = self
            .layout
            .installed_ids()
            .map_err(|e| ResolveError::FailedInstallSearch(e.to_string()))?;

        let mut best: Option<(String, ZigVersion)> = None;
        for id in ids {
            let Ok(version) = id[ID_PREFIX.len()..].parse::<ZigVersion>() else {
                continue;
            };
            if stable_only && version.is_prerelease() {
                continue;
            }
            match best {
                Some((_, ref held)) if version <= *held => {}
                _ => best = Some((id, version)),
            }
        }
        best.ok_or(ResolveError::NoInstalledVersions)
    }
}

fn record_from_entry(
    id: &str,
    entry: &ReleaseEntry,
    platform: &HostPlatform,
) -> Result<ReleaseRecord, ResolveError> {
    let token = platform.index_token();
    let url = entry
        .tarball(&token)
        .ok_or_else(|| ResolveError::UnsupportedSystem(token.clone()))?;
    Ok(ReleaseRecord {
        id: id.to_string(),
        url: url.to_string(),
        date: entry.date.clone(),
    })
}

fn channel_record(
    doc: &IndexDocument,
    channel: &str,
    platform: &HostPlatform,
) -> Result<ReleaseRecord, ResolveError> {
    let entry = doc
        .get(channel)
        .ok_or_else(|| ResolveError::InvalidIndexJson(format!("missing '{channel}' entry")))?;
    let version = entry
        .version
        .as_deref()
        .ok_or_else(|| ResolveError::InvalidIndexJson(format!("'{channel}' has no version")))?;
    record_from_entry(&format!("{ID_PREFIX}{version}"), entry, platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(json: &str, kind: IndexKind, dir: &std::path::Path) -> IndexStore {
        let mut store = IndexStore::with_cache_dir(dir);
        store.preload(kind, IndexDocument::parse(json).unwrap());
        store
    }

    fn token() -> String {
        HostPlatform::current().unwrap().index_token()
    }

    fn zig_index() -> String {
        format!(
            r#"{{
                "master": {{
                    "version": "0.14.0-dev.121+ab3c1f2d9",
                    "date": "2024-06-01",
                    "{token}": {{ "tarball": "https://ziglang.org/builds/master.tar.xz" }}
                }},
                "0.13.0": {{
                    "date": "2024-06-07",
                    "{token}": {{ "tarball": "https://ziglang.org/download/0.13.0/zig.tar.xz" }}
                }},
                "0.12.0": {{
                    "date": "2024-04-20",
                    "{token}": {{ "tarball": "https://ziglang.org/download/0.12.0/zig.tar.xz" }}
                }}
            }}"#,
            token = token()
        )
    }

    #[tokio::test]
    async fn test_stable_picks_highest_release() {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path());
        let mut store = store_with(&zig_index(), IndexKind::Zig, dir.path());
        let mut resolver = VersionResolver::new(VersionSpec::Stable, &mut store, &layout);

        assert_eq!(resolver.id().await.unwrap(), "zig-0.13.0");
        assert_eq!(
            resolver.url().await.unwrap(),
            "https://ziglang.org/download/0.13.0/zig.tar.xz"
        );
        assert_eq!(resolver.date().await.unwrap(), "2024-06-07");
    }

    #[tokio::test]
    async fn test_master_uses_channel_version() {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path());
        let mut store = store_with(&zig_index(), IndexKind::Zig, dir.path());
        let mut resolver = VersionResolver::new(VersionSpec::Master, &mut store, &layout);

        assert_eq!(resolver.id().await.unwrap(), "zig-0.14.0-dev.121+ab3c1f2d9");
        assert_eq!(resolver.date().await.unwrap(), "2024-06-01");
    }

    #[tokio::test]
    async fn test_tagged_resolves_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path());
        let mut store = store_with(&zig_index(), IndexKind::Zig, dir.path());
        let spec = VersionSpec::Tagged(ZigVersion::new(0, 12, 0));
        let mut resolver = VersionResolver::new(spec, &mut store, &layout);

        assert_eq!(resolver.id().await.unwrap(), "zig-0.12.0");
        assert_eq!(resolver.date().await.unwrap(), "2024-04-20");
    }

    #[tokio::test]
    async fn test_dev_synthesizes_url_and_has_no_date() {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path());
        let mut store = IndexStore::with_cache_dir(dir.path());
        let spec: VersionSpec = "0.13.0-dev.351+d0cd54c64".parse().unwrap();
        let mut resolver = VersionResolver::new(spec, &mut store, &layout);

        assert_eq!(resolver.id().await.unwrap(), "zig-0.13.0-dev.351+d0cd54c64");
        let url = resolver.url().await.unwrap().to_string();
        assert!(url.starts_with("https://ziglang.org/builds/zig-"));
        assert!(url.contains("0.13.0-dev.351+d0cd54c64"));
        assert_eq!(resolver.date().await.unwrap_err(), ResolveError::NoDate);
        // NoDate does not poison the other getters.
        assert!(resolver.id().await.is_ok());
    }

    #[tokio::test]
    async fn test_latest_installed_scans_install_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("zig-0.12.0")).unwrap();
        std::fs::create_dir(dir.path().join("zig-0.13.0-dev.1+abc")).unwrap();
        let layout = InstallLayout::new(dir.path());
        let mut store = IndexStore::with_cache_dir(dir.path());
        let mut resolver =
            VersionResolver::new(VersionSpec::LatestInstalled, &mut store, &layout);

        // The prerelease is newer than 0.12.0 under semver ordering.
        assert_eq!(resolver.id().await.unwrap(), "zig-0.13.0-dev.1+abc");
        assert_eq!(resolver.date().await.unwrap_err(), ResolveError::NoDate);
    }

    #[tokio::test]
    async fn test_stable_installed_excludes_prereleases() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("zig-0.12.0")).unwrap();
        std::fs::create_dir(dir.path().join("zig-0.13.0-dev.1+abc")).unwrap();
        let layout = InstallLayout::new(dir.path());
        let mut store = store_with(&zig_index(), IndexKind::Zig, dir.path());
        let mut resolver =
            VersionResolver::new(VersionSpec::StableInstalled, &mut store, &layout);

        assert_eq!(resolver.id().await.unwrap(), "zig-0.12.0");
        // Listed in the index, so the date comes along.
        assert_eq!(resolver.date().await.unwrap(), "2024-04-20");
    }

    #[tokio::test]
    async fn test_latest_installed_on_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path());
        let mut store = IndexStore::with_cache_dir(dir.path());
        let mut resolver =
            VersionResolver::new(VersionSpec::LatestInstalled, &mut store, &layout);

        assert_eq!(
            resolver.id().await.unwrap_err(),
            ResolveError::NoInstalledVersions
        );
        // The failure is sticky.
        assert_eq!(
            resolver.url().await.unwrap_err(),
            ResolveError::NoInstalledVersions
        );
    }

    #[tokio::test]
    async fn test_mach_key_carries_version_field() {
        let dir = tempfile::tempdir().unwrap();
        let mach = format!(
            r#"{{
                "0.3.0-mach": {{
                    "version": "0.12.0-dev.3180+83e578a18",
                    "date": "2024-03-01",
                    "{token}": {{ "tarball": "https://pkg.machengine.org/zig/zig.tar.xz" }}
                }}
            }}"#,
            token = token()
        );
        let layout = InstallLayout::new(dir.path());
        let mut store = store_with(&mach, IndexKind::Mach, dir.path());
        let spec = VersionSpec::Mach("0.3.0-mach".to_string());
        let mut resolver = VersionResolver::new(spec, &mut store, &layout);

        assert_eq!(resolver.id().await.unwrap(), "zig-0.12.0-dev.3180+83e578a18");
        assert_eq!(resolver.date().await.unwrap(), "2024-03-01");
    }
}
