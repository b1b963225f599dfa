//! Zig toolchain management.
//!
//! This crate provides:
//! - Host platform detection for download URLs
//! - Path conventions for the install directory
//! - Version spec parsing and resolution against the release indexes
//! - Atomic download-and-extract compiler installs
//! - The default-toolchain pointer (symlink or launcher splice)
//! - Lifecycle operations: list, keep, clean, run

pub mod archive;
pub mod install;
pub mod launcher;
pub mod layout;
pub mod lifecycle;
pub mod link;
pub mod platform;
pub mod resolver;
pub mod versions;

pub use archive::{ArchiveKind, url_basename};
pub use install::install;
pub use layout::{ID_PREFIX, InstallLayout, install_path_to_version};
pub use lifecycle::{ListEntry, clean, clean_outdated, keep, list, run};
pub use link::{read_default, set_default};
pub use platform::{HostPlatform, exe_name};
pub use resolver::{ReleaseRecord, ResolveError, VersionResolver};
pub use versions::VersionSpec;
