//! Install lifecycle operations: list, keep, clean, run.

use crate::layout::{ID_PREFIX, InstallLayout};
use std::ffi::OsString;
use tracing::{debug, info};
use zigup_core::{CommandRunner, Error, ExitStatus, Fix, ZigVersion};

/// One row of `zigup list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: String,
    /// `.keep` marker present.
    pub keep: bool,
    /// This install is the current default.
    pub is_default: bool,
}

/// Enumerate completed installs, ascending by name.
pub fn list(layout: &InstallLayout, default_id: Option<&str>) -> Result<Vec<ListEntry>, Error> {
    let mut ids = layout.installed_ids()?;
    ids.sort();
    Ok(ids
        .into_iter()
        .map(|id| ListEntry {
            keep: layout.keep_marker(&id).exists(),
            is_default: default_id == Some(id.as_str()),
            id,
        })
        .collect())
}

/// Mark an install as exempt from `clean outdated`.
///
/// An existing marker is a no-op; a missing install is a user error.
pub fn keep(layout: &InstallLayout, id: &str) -> Result<(), Error> {
    if !layout.is_installed(id) {
        return Err(not_installed(id));
    }
    let marker = layout.keep_marker(id);
    std::fs::write(&marker, b"")
        .map_err(|e| Error::io("failed to create keep marker", &marker, e))?;
    info!("Marked {} as kept", id);
    Ok(())
}

/// Delete one install. Returns whether anything was removed.
pub fn clean(layout: &InstallLayout, id: &str) -> Result<bool, Error> {
    let dir = layout.compiler_dir(id);
    match std::fs::remove_dir_all(&dir) {
        Ok(()) => {
            info!("Removed {}", id);
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io("failed to remove install", &dir, e)),
    }
}

/// Delete every install that is neither the newest, the newest release,
/// nor marked `.keep`. The `zls-repo` mirror is never touched.
///
/// Returns the removed ids.
pub fn clean_outdated(layout: &InstallLayout) -> Result<Vec<String>, Error> {
    let ids = layout.installed_ids()?;

    let parse = |id: &str| id[ID_PREFIX.len()..].parse::<ZigVersion>().ok();
    let best = |stable_only: bool| -> Option<String> {
        let mut best: Option<(&str, ZigVersion)> = None;
        for id in &ids {
            let Some(version) = parse(id) else { continue };
            if stable_only && version.is_prerelease() {
                continue;
            }
            match best {
                Some((_, ref held)) if version <= *held => {}
                _ => best = Some((id, version)),
            }
        }
        best.map(|(id, _)| id.to_string())
    };

    let latest = best(false);
    let latest_stable = best(true);

    let mut removed = Vec::new();
    for id in ids {
        if Some(&id) == latest.as_ref() || Some(&id) == latest_stable.as_ref() {
            debug!("Keeping {} (current)", id);
            continue;
        }
        if layout.keep_marker(&id).exists() {
            debug!("Keeping {} (.keep)", id);
            continue;
        }
        clean(layout, &id)?;
        removed.push(id);
    }
    Ok(removed)
}

/// Run an installed compiler, forwarding arguments and stdio.
pub async fn run(
    layout: &InstallLayout,
    id: &str,
    args: Vec<OsString>,
) -> Result<ExitStatus, Error> {
    let bin = layout.compiler_bin(id);
    if !bin.is_file() {
        return Err(not_installed(id));
    }
    CommandRunner::new().status(bin, args).await
}

fn not_installed(id: &str) -> Error {
    Error::NotInstalled {
        id: id.to_string(),
        fixes: vec![Fix::with_command(
            format!("fetch {} first", id),
            format!("zigup fetch {}", &id[ID_PREFIX.len().min(id.len())..]),
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_layout(ids: &[&str]) -> (tempfile::TempDir, InstallLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path());
        for id in ids {
            let files = layout.compiler_dir(id).join("files");
            std::fs::create_dir_all(&files).unwrap();
            std::fs::write(files.join("zig"), b"#!zig").unwrap();
        }
        (dir, layout)
    }

    #[test]
    fn test_list_sorted_with_annotations() {
        let (_dir, layout) = seeded_layout(&["zig-0.13.0", "zig-0.11.0", "zig-0.12.0"]);
        keep(&layout, "zig-0.11.0").unwrap();

        let entries = list(&layout, Some("zig-0.12.0")).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["zig-0.11.0", "zig-0.12.0", "zig-0.13.0"]);
        assert!(entries[0].keep);
        assert!(entries[1].is_default);
        assert!(!entries[2].keep);
    }

    #[test]
    fn test_keep_missing_install_is_user_error() {
        let (_dir, layout) = seeded_layout(&[]);
        let err = keep(&layout, "zig-0.13.0").unwrap_err();
        assert!(matches!(err, Error::NotInstalled { .. }));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_keep_twice_is_noop() {
        let (_dir, layout) = seeded_layout(&["zig-0.13.0"]);
        keep(&layout, "zig-0.13.0").unwrap();
        keep(&layout, "zig-0.13.0").unwrap();
        assert!(layout.keep_marker("zig-0.13.0").exists());
    }

    #[test]
    fn test_clean_removes_install() {
        let (_dir, layout) = seeded_layout(&["zig-0.13.0"]);
        assert!(clean(&layout, "zig-0.13.0").unwrap());
        assert!(!layout.is_installed("zig-0.13.0"));
        // Second clean is a no-op, not an error.
        assert!(!clean(&layout, "zig-0.13.0").unwrap());
    }

    #[test]
    fn test_clean_outdated_keeps_latest_stable_and_kept() {
        let (_dir, layout) = seeded_layout(&[
            "zig-0.11.0",
            "zig-0.12.0",
            "zig-0.13.0-dev.1+abc",
            "zig-0.13.0",
        ]);
        keep(&layout, "zig-0.11.0").unwrap();

        let mut removed = clean_outdated(&layout).unwrap();
        removed.sort();
        assert_eq!(removed, ["zig-0.13.0-dev.1+abc"]);

        let mut remaining = layout.installed_ids().unwrap();
        remaining.sort();
        assert_eq!(remaining, ["zig-0.11.0", "zig-0.12.0", "zig-0.13.0"]);
    }

    #[test]
    fn test_clean_outdated_when_latest_is_prerelease() {
        let (_dir, layout) = seeded_layout(&["zig-0.12.0", "zig-0.13.0-dev.5+abc"]);

        // The prerelease is the latest overall, 0.12.0 the latest stable;
        // both survive.
        let removed = clean_outdated(&layout).unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn test_clean_outdated_spares_zls_repo() {
        let (_dir, layout) = seeded_layout(&["zig-0.12.0", "zig-0.13.0"]);
        std::fs::create_dir_all(layout.zls_repo()).unwrap();

        clean_outdated(&layout).unwrap();
        assert!(layout.zls_repo().exists());
    }

    #[tokio::test]
    async fn test_run_missing_install_is_user_error() {
        let (_dir, layout) = seeded_layout(&[]);
        let err = run(&layout, "zig-0.13.0", vec![]).await.unwrap_err();
        assert!(matches!(err, Error::NotInstalled { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_forwards_exit_code() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, layout) = seeded_layout(&["zig-0.13.0"]);
        let bin = layout.compiler_bin("zig-0.13.0");
        std::fs::write(&bin, "#!/bin/sh\nexit 7\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        let status = run(&layout, "zig-0.13.0", vec!["version".into()])
            .await
            .unwrap();
        assert_eq!(status.propagate(), 7);
    }

    #[test]
    fn test_clean_outdated_wipes_everything_else_without_markers() {
        let (_dir, layout) = seeded_layout(&["zig-0.10.0", "zig-0.11.0", "zig-0.12.0"]);
        let mut removed = clean_outdated(&layout).unwrap();
        removed.sort();
        assert_eq!(removed, ["zig-0.10.0", "zig-0.11.0"]);
    }
}
