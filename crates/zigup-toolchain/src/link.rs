//! The default-toolchain pointer.
//!
//! On POSIX the pointer is a symlink whose target is the installed
//! compiler binary; the install id is recoverable from the target path.
//! On Windows it is a copy of the launcher executable with the target
//! spliced in (see [`crate::launcher`]).

use crate::layout::{InstallLayout, install_path_to_version};
use std::path::Path;
use tracing::debug;
use zigup_core::Error;

/// Point the default `zig` (and, when built, `zls`) at the install `id`.
pub fn set_default(
    layout: &InstallLayout,
    id: &str,
    zig_link: &Path,
    zls_link: &Path,
) -> Result<(), Error> {
    write_pointer(zig_link, &layout.compiler_bin(id))?;

    // The zls pointer follows only when a zls has been built for this
    // install; a stale pointer to another version must not survive.
    remove_pointer(zls_link)?;
    let zls_bin = layout.zls_bin(id);
    if zls_bin.is_file() {
        write_pointer(zls_link, &zls_bin)?;
    }
    Ok(())
}

/// Read the install id the default pointer refers to.
///
/// `None` when no pointer exists or it points outside the install dir.
pub fn read_default(zig_link: &Path) -> Result<Option<String>, Error> {
    match read_pointer(zig_link)? {
        Some(target) => Ok(install_path_to_version(&target)),
        None => Ok(None),
    }
}

fn remove_pointer(link: &Path) -> Result<(), Error> {
    match std::fs::remove_file(link) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io("failed to remove default pointer", link, e)),
    }
}

fn write_pointer(link: &Path, target: &Path) -> Result<(), Error> {
    remove_pointer(link)?;
    if let Some(parent) = link.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::io("failed to create pointer directory", parent, e))?;
    }
    debug!("Pointing {} at {}", link.display(), target.display());
    platform::create(link, target)
}

fn read_pointer(link: &Path) -> Result<Option<std::path::PathBuf>, Error> {
    platform::read(link)
}

#[cfg(unix)]
mod platform {
    use std::path::{Path, PathBuf};
    use zigup_core::Error;

    pub fn create(link: &Path, target: &Path) -> Result<(), Error> {
        std::os::unix::fs::symlink(target, link)
            .map_err(|e| Error::io("failed to create symlink", link, e))
    }

    pub fn read(link: &Path) -> Result<Option<PathBuf>, Error> {
        match std::fs::read_link(link) {
            Ok(target) => Ok(Some(target)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            // A plain file where the symlink should be is not a pointer.
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(None),
            Err(e) => Err(Error::io("failed to read default pointer", link, e)),
        }
    }
}

#[cfg(windows)]
mod platform {
    use crate::launcher::{read_target, splice_target};
    use std::path::{Path, PathBuf};
    use zigup_core::Error;

    /// The launcher executable ships next to zigup itself.
    fn launcher_image() -> Result<Vec<u8>, Error> {
        let exe = std::env::current_exe()
            .map_err(|e| Error::Io {
                message: "failed to locate the running executable".into(),
                path: None,
                source: e,
            })?;
        let path = exe.with_file_name("zigup-launcher.exe");
        std::fs::read(&path).map_err(|e| Error::io("failed to read launcher image", &path, e))
    }

    pub fn create(link: &Path, target: &Path) -> Result<(), Error> {
        let image = launcher_image()?;
        let spliced = splice_target(&image, target)?;
        std::fs::write(link, spliced)
            .map_err(|e| Error::io("failed to write launcher pointer", link, e))
    }

    pub fn read(link: &Path) -> Result<Option<PathBuf>, Error> {
        let image = match std::fs::read(link) {
            Ok(image) => image,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io("failed to read default pointer", link, e)),
        };
        read_target(&image).map(Some)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn seeded_layout() -> (tempfile::TempDir, InstallLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path().join("installs"));
        for id in ["zig-0.12.0", "zig-0.13.0"] {
            let files = layout.compiler_dir(id).join("files");
            std::fs::create_dir_all(&files).unwrap();
            std::fs::write(files.join("zig"), b"#!zig").unwrap();
        }
        (dir, layout)
    }

    #[test]
    fn test_set_then_read_round_trips() {
        let (dir, layout) = seeded_layout();
        let zig_link = dir.path().join("bin").join("zig");
        let zls_link = dir.path().join("bin").join("zls");

        set_default(&layout, "zig-0.13.0", &zig_link, &zls_link).unwrap();
        assert_eq!(
            read_default(&zig_link).unwrap().as_deref(),
            Some("zig-0.13.0")
        );
    }

    #[test]
    fn test_set_replaces_previous_pointer() {
        let (dir, layout) = seeded_layout();
        let zig_link = dir.path().join("zig");
        let zls_link = dir.path().join("zls");

        set_default(&layout, "zig-0.12.0", &zig_link, &zls_link).unwrap();
        set_default(&layout, "zig-0.13.0", &zig_link, &zls_link).unwrap();
        assert_eq!(
            read_default(&zig_link).unwrap().as_deref(),
            Some("zig-0.13.0")
        );
    }

    #[test]
    fn test_read_missing_pointer_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_default(&dir.path().join("zig")).unwrap(), None);
    }

    #[test]
    fn test_zls_pointer_follows_only_when_built() {
        let (dir, layout) = seeded_layout();
        let zig_link = dir.path().join("zig");
        let zls_link = dir.path().join("zls");

        set_default(&layout, "zig-0.13.0", &zig_link, &zls_link).unwrap();
        assert!(!zls_link.exists());

        std::fs::write(layout.zls_bin("zig-0.13.0"), b"#!zls").unwrap();
        set_default(&layout, "zig-0.13.0", &zig_link, &zls_link).unwrap();
        assert!(zls_link.exists());

        // Switching to an install without zls drops the stale pointer.
        set_default(&layout, "zig-0.12.0", &zig_link, &zls_link).unwrap();
        assert!(!zls_link.exists());
    }
}
