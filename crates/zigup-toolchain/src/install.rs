//! Atomic compiler installation.
//!
//! All partial state lives under `<id>.installing`; the rename to the final
//! directory name is the commit point. A crash at any earlier step leaves
//! only `.installing` residue, which the next attempt deletes wholesale.

use crate::archive::{ArchiveKind, archive_root_name, extract, url_basename};
use crate::layout::InstallLayout;
use crate::platform::exe_name;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};
use zigup_core::Error;
use zigup_index::download_with;

/// Install the compiler archive at `url` as `id`.
///
/// Returns `false` when `id` was already installed (a no-op), `true` for a
/// fresh install. `progress` receives `(bytes, total)` during the download.
pub async fn install<F>(
    layout: &InstallLayout,
    id: &str,
    url: &str,
    progress: F,
) -> Result<bool, Error>
where
    F: FnMut(u64, Option<u64>),
{
    let compiler_dir = layout.compiler_dir(id);
    if compiler_dir.exists() {
        debug!("{} is already installed", id);
        return Ok(false);
    }

    // Classify before downloading anything.
    let basename = url_basename(url);
    let kind = ArchiveKind::from_basename(basename)?;

    // Reclaim any residue from an interrupted attempt.
    let installing = layout.installing_dir(id);
    if installing.exists() {
        debug!("Removing stale {}", installing.display());
        fs::remove_dir_all(&installing)
            .map_err(|e| Error::io("failed to remove stale install staging", &installing, e))?;
    }
    fs::create_dir_all(&installing)
        .map_err(|e| Error::io("failed to create install staging", &installing, e))?;

    let archive_path = installing.join(basename);
    let download_result = {
        let mut file = File::create(&archive_path)
            .map_err(|e| Error::io("failed to create archive file", &archive_path, e))?;
        download_with(url, &mut file, progress).await
        // The file handle closes here, before any cleanup can delete its
        // parent directory.
    };
    if let Err(e) = download_result {
        let _ = fs::remove_dir_all(&installing);
        return Err(e);
    }

    extract(&archive_path, &installing, kind)?;

    // Normalize the archive's internal top-level directory name.
    let root = installing.join(archive_root_name(basename, kind));
    let files = installing.join("files");
    fs::rename(&root, &files)
        .map_err(|e| Error::io("archive layout was not the expected single root", &root, e))?;

    fs::remove_file(&archive_path)
        .map_err(|e| Error::io("failed to remove downloaded archive", &archive_path, e))?;

    restore_exec_permission(&files.join(exe_name("zig")))?;

    // Commit point: from here the install is complete or absent.
    fs::rename(&installing, &compiler_dir)
        .map_err(|e| Error::io("failed to finalize install", &compiler_dir, e))?;

    info!("Installed {}", id);
    Ok(true)
}

/// Zip extraction does not carry the unix exec bit.
#[cfg(unix)]
fn restore_exec_permission(bin: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;

    if bin.is_file() {
        let mut perms = fs::metadata(bin)
            .map_err(|e| Error::io("failed to stat compiler binary", bin, e))?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(bin, perms)
            .map_err(|e| Error::io("failed to mark compiler executable", bin, e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn restore_exec_permission(_bin: &Path) -> Result<(), Error> {
    Ok(())
}
