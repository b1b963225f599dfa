//! Release index handling for zigup.
//!
//! This crate provides:
//! - Streaming HTTP downloads
//! - Parsing of the ziglang.org and machengine.org release indexes
//! - A two-tier cache (disk + per-process memoization) over both

pub mod document;
pub mod download;
pub mod store;

pub use document::{IndexDocument, ReleaseEntry};
pub use download::{download, download_to_string, download_with};
pub use store::{CachePolicy, IndexError, IndexKind, IndexStore, cache_file};
