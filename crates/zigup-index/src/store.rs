//! Fetching and caching of the release indexes.

use crate::document::IndexDocument;
use crate::download::download_to_string;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Which release index to consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Official releases from ziglang.org.
    Zig,
    /// Mach nominated versions from machengine.org.
    Mach,
}

impl IndexKind {
    /// Remote endpoint for this index.
    pub fn url(self) -> &'static str {
        match self {
            IndexKind::Zig => "https://ziglang.org/download/index.json",
            IndexKind::Mach => "https://machengine.org/zig/index.json",
        }
    }

    /// On-disk cache file name.
    pub fn cache_file_name(self) -> &'static str {
        match self {
            IndexKind::Zig => "index-zig.json",
            IndexKind::Mach => "index-mach.json",
        }
    }
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Zig => f.write_str("zig"),
            IndexKind::Mach => f.write_str("mach"),
        }
    }
}

/// How hard to try to avoid the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Always re-fetch, overwrite the cache, return fresh.
    NeverCache,
    /// Return the cached document if present and parseable, else fetch.
    TryCache,
    /// Fetch once for this process, cache, return.
    AlwaysCache,
}

/// Error type for index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("could not determine the platform cache directory")]
    NoCacheDirectory,

    #[error(transparent)]
    Download(zigup_core::Error),

    #[error("failed to write index cache: {0}")]
    WriteCacheFailed(#[source] std::io::Error),

    #[error("failed to read index cache: {0}")]
    ReadCacheFailed(#[source] std::io::Error),

    #[error("failed to parse {kind} index: {source}")]
    ParseFailed {
        kind: IndexKind,
        #[source]
        source: serde_json::Error,
    },
}

impl From<IndexError> for zigup_core::Error {
    fn from(e: IndexError) -> Self {
        use zigup_core::Error;
        match e {
            IndexError::NoCacheDirectory => Error::NoCacheDirectory,
            IndexError::Download(inner) => inner,
            IndexError::WriteCacheFailed(source) => Error::Io {
                message: "failed to write index cache".into(),
                path: None,
                source,
            },
            IndexError::ReadCacheFailed(source) => Error::Io {
                message: "failed to read index cache".into(),
                path: None,
                source,
            },
            IndexError::ParseFailed { kind, source } => {
                Error::parse(format!("{kind} index: {source}"))
            }
        }
    }
}

/// Serves the two release indexes with a disk cache and per-process
/// memoization.
///
/// Once a kind has been served, later `get` calls for it return the same
/// document regardless of policy.
#[derive(Debug)]
pub struct IndexStore {
    cache_dir: PathBuf,
    memo: HashMap<IndexKind, IndexDocument>,
}

impl IndexStore {
    /// Create a store caching under the platform cache directory.
    pub fn new() -> Result<Self, IndexError> {
        let cache_dir = zigup_config::cache_dir().map_err(|_| IndexError::NoCacheDirectory)?;
        Ok(Self::with_cache_dir(cache_dir))
    }

    /// Create a store with an explicit cache directory.
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            memo: HashMap::new(),
        }
    }

    /// Path of the cache file for one index.
    pub fn cache_path(&self, kind: IndexKind) -> PathBuf {
        self.cache_dir.join(kind.cache_file_name())
    }

    /// Get a parsed index document under the given cache policy.
    pub async fn get(
        &mut self,
        kind: IndexKind,
        policy: CachePolicy,
    ) -> Result<&IndexDocument, IndexError> {
        if self.memo.contains_key(&kind) {
            debug!("Using in-process {} index", kind);
            return Ok(&self.memo[&kind]);
        }

        let document = match policy {
            CachePolicy::TryCache => match self.load_cached(kind) {
                Some(doc) => doc,
                None => self.fetch_and_cache(kind).await?,
            },
            CachePolicy::NeverCache | CachePolicy::AlwaysCache => {
                self.fetch_and_cache(kind).await?
            }
        };

        Ok(self.memo.entry(kind).or_insert(document))
    }

    /// Re-fetch an index, replacing both the disk cache and the memo.
    ///
    /// This is the escape hatch for a stale cached index: plain `get` never
    /// re-fetches a kind once it has been served.
    pub async fn refresh(&mut self, kind: IndexKind) -> Result<&IndexDocument, IndexError> {
        let document = self.fetch_and_cache(kind).await?;
        self.memo.insert(kind, document);
        Ok(&self.memo[&kind])
    }

    fn load_cached(&self, kind: IndexKind) -> Option<IndexDocument> {
        let path = self.cache_path(kind);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read {} index cache: {}", kind, e);
                return None;
            }
        };
        match IndexDocument::parse(&text) {
            Ok(doc) => {
                debug!("Loaded {} index from {}", kind, path.display());
                Some(doc)
            }
            Err(e) => {
                warn!("Corrupt {} index cache, refetching: {}", kind, e);
                None
            }
        }
    }

    async fn fetch_and_cache(&self, kind: IndexKind) -> Result<IndexDocument, IndexError> {
        let text = download_to_string(kind.url())
            .await
            .map_err(IndexError::Download)?;
        let document =
            IndexDocument::parse(&text).map_err(|source| IndexError::ParseFailed { kind, source })?;

        self.write_cache(kind, &text)?;
        debug!(releases = document.len(), "Fetched {} index", kind);
        Ok(document)
    }

    fn write_cache(&self, kind: IndexKind, text: &str) -> Result<(), IndexError> {
        std::fs::create_dir_all(&self.cache_dir).map_err(IndexError::WriteCacheFailed)?;
        std::fs::write(self.cache_path(kind), text).map_err(IndexError::WriteCacheFailed)
    }

    /// Seed the in-process memo, for tests.
    #[doc(hidden)]
    pub fn preload(&mut self, kind: IndexKind, document: IndexDocument) {
        self.memo.insert(kind, document);
    }
}

/// Write an index cache file by hand, as `zigup fetch-index` does.
pub fn cache_file(cache_dir: &Path, kind: IndexKind, text: &str) -> Result<PathBuf, IndexError> {
    std::fs::create_dir_all(cache_dir).map_err(IndexError::WriteCacheFailed)?;
    let path = cache_dir.join(kind.cache_file_name());
    std::fs::write(&path, text).map_err(IndexError::WriteCacheFailed)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "0.13.0": {
            "date": "2024-06-07",
            "x86_64-linux": { "tarball": "https://ziglang.org/download/0.13.0/zig-linux-x86_64-0.13.0.tar.xz" }
        }
    }"#;

    #[tokio::test]
    async fn test_try_cache_uses_disk_cache() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index-zig.json"), SAMPLE).unwrap();

        let mut store = IndexStore::with_cache_dir(dir.path());
        let doc = store.get(IndexKind::Zig, CachePolicy::TryCache).await.unwrap();
        assert!(doc.get("0.13.0").is_some());
    }

    #[tokio::test]
    async fn test_memo_wins_over_policy() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index-zig.json"), SAMPLE).unwrap();

        let mut store = IndexStore::with_cache_dir(dir.path());
        let first = store
            .get(IndexKind::Zig, CachePolicy::TryCache)
            .await
            .unwrap()
            .len();

        // Delete the cache; NeverCache would have to hit the network if the
        // memo did not win.
        std::fs::remove_file(dir.path().join("index-zig.json")).unwrap();
        let second = store
            .get(IndexKind::Zig, CachePolicy::NeverCache)
            .await
            .unwrap()
            .len();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cache_paths_are_per_kind() {
        let store = IndexStore::with_cache_dir("/tmp/zigup-cache");
        assert!(store.cache_path(IndexKind::Zig).ends_with("index-zig.json"));
        assert!(store.cache_path(IndexKind::Mach).ends_with("index-mach.json"));
    }

    #[test]
    fn test_kind_urls() {
        assert_eq!(IndexKind::Zig.url(), "https://ziglang.org/download/index.json");
        assert_eq!(IndexKind::Mach.url(), "https://machengine.org/zig/index.json");
    }
}
