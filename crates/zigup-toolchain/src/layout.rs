//! Path conventions for the install directory.
//!
//! ```text
//! <install_dir>/
//!   zig-0.13.0/files/zig        completed install
//!   zig-0.13.0/zls              zls built against that compiler
//!   zig-0.13.0/.keep            exemption from `clean outdated`
//!   zig-0.14.0.installing/      staging area, transient
//!   zls-repo/                   zls source mirror
//! ```
//!
//! A directory whose name does not end in `.installing` is a completed
//! install; partial state only ever lives under the `.installing` sibling.

use crate::platform::exe_name;
use std::path::{Path, PathBuf};
use zigup_core::{Error, ZigVersion};

/// Suffix of the staging directory for an in-flight install.
pub const INSTALLING_SUFFIX: &str = ".installing";

/// Prefix of install directory names.
pub const ID_PREFIX: &str = "zig-";

/// Name of the zls source mirror under the install root.
pub const ZLS_REPO_DIR: &str = "zls-repo";

/// Path helpers for one install root.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    install_dir: PathBuf,
}

impl InstallLayout {
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
        }
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// `<install_dir>/<id>`
    pub fn compiler_dir(&self, id: &str) -> PathBuf {
        self.install_dir.join(id)
    }

    /// `<install_dir>/<id>/files/zig[.exe]`
    pub fn compiler_bin(&self, id: &str) -> PathBuf {
        self.compiler_dir(id).join("files").join(exe_name("zig"))
    }

    /// `<install_dir>/<id>/zls[.exe]`
    pub fn zls_bin(&self, id: &str) -> PathBuf {
        self.compiler_dir(id).join(exe_name("zls"))
    }

    /// `<install_dir>/<id>.installing`
    pub fn installing_dir(&self, id: &str) -> PathBuf {
        let mut name = id.to_string();
        name.push_str(INSTALLING_SUFFIX);
        self.install_dir.join(name)
    }

    /// `<install_dir>/<id>/.keep`
    pub fn keep_marker(&self, id: &str) -> PathBuf {
        self.compiler_dir(id).join(".keep")
    }

    /// `<install_dir>/zls-repo`
    pub fn zls_repo(&self) -> PathBuf {
        self.install_dir.join(ZLS_REPO_DIR)
    }

    /// Whether `id` is a completed install.
    pub fn is_installed(&self, id: &str) -> bool {
        self.compiler_dir(id).is_dir()
    }

    /// Ids of all completed installs, unsorted.
    ///
    /// A missing install root means no installs, not an error.
    pub fn installed_ids(&self) -> Result<Vec<String>, Error> {
        let entries = match std::fs::read_dir(&self.install_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::io(
                    "failed to read install directory",
                    &self.install_dir,
                    e,
                ));
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::io("failed to read install directory", &self.install_dir, e)
            })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(ID_PREFIX) || name.ends_with(INSTALLING_SUFFIX) {
                continue;
            }
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                ids.push(name.to_string());
            }
        }
        Ok(ids)
    }

    /// Versions of all completed installs whose ids parse.
    pub fn installed_versions(&self) -> Result<Vec<ZigVersion>, Error> {
        Ok(self
            .installed_ids()?
            .iter()
            .filter_map(|id| id[ID_PREFIX.len()..].parse().ok())
            .collect())
    }
}

/// Recover the install id from a default-pointer target.
///
/// `<install_dir>/zig-<ver>/files/zig` maps back to `zig-<ver>`.
pub fn install_path_to_version(path: &Path) -> Option<String> {
    let id = path.parent()?.parent()?.file_name()?.to_str()?;
    id.starts_with(ID_PREFIX).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = InstallLayout::new("/data/zigup");
        assert_eq!(
            layout.compiler_dir("zig-0.13.0"),
            PathBuf::from("/data/zigup/zig-0.13.0")
        );
        assert_eq!(
            layout.installing_dir("zig-0.13.0"),
            PathBuf::from("/data/zigup/zig-0.13.0.installing")
        );
        assert_eq!(
            layout.keep_marker("zig-0.13.0"),
            PathBuf::from("/data/zigup/zig-0.13.0/.keep")
        );
        assert_eq!(layout.zls_repo(), PathBuf::from("/data/zigup/zls-repo"));
    }

    #[test]
    fn test_compiler_bin_round_trips_through_path_to_version() {
        let layout = InstallLayout::new("/data/zigup");
        let bin = layout.compiler_bin("zig-0.13.0-dev.351+d0cd54c64");
        assert_eq!(
            install_path_to_version(&bin).as_deref(),
            Some("zig-0.13.0-dev.351+d0cd54c64")
        );
    }

    #[test]
    fn test_path_to_version_rejects_foreign_paths() {
        assert_eq!(install_path_to_version(Path::new("/usr/bin/zig")), None);
        assert_eq!(install_path_to_version(Path::new("zig")), None);
    }

    #[test]
    fn test_installed_ids_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path().join("nope"));
        assert!(layout.installed_ids().unwrap().is_empty());
    }

    #[test]
    fn test_installed_ids_skips_partial_and_foreign_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("zig-0.13.0")).unwrap();
        std::fs::create_dir(dir.path().join("zig-0.14.0.installing")).unwrap();
        std::fs::create_dir(dir.path().join("zls-repo")).unwrap();
        std::fs::write(dir.path().join("zig-0.12.0"), b"a file, not a dir").unwrap();

        let layout = InstallLayout::new(dir.path());
        let ids = layout.installed_ids().unwrap();
        assert_eq!(ids, vec!["zig-0.13.0".to_string()]);
    }

    #[test]
    fn test_installed_versions_parse() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("zig-0.13.0")).unwrap();
        std::fs::create_dir(dir.path().join("zig-0.12.0")).unwrap();

        let layout = InstallLayout::new(dir.path());
        let mut versions = layout.installed_versions().unwrap();
        versions.sort();
        assert_eq!(versions.last().unwrap(), &ZigVersion::new(0, 13, 0));
    }
}
