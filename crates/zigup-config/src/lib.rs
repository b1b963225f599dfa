//! Configuration for zigup.
//!
//! Persistent settings live in `zigup.conf` in the platform config
//! directory, a line-oriented `key=value` file with three known keys:
//! `install_dir`, `zig_symlink`, `zls_symlink`. A missing file means
//! all-defaults; an unknown key is a parse error. Per-invocation CLI flags
//! override the file without persisting.

use directories::ProjectDirs;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use zigup_core::EnvVars;

/// Error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the platform config directory")]
    NoConfigDirectory,

    #[error("could not determine the platform data directory")]
    NoDataDirectory,

    #[error("could not determine the platform cache directory")]
    NoCacheDirectory,

    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),

    #[error("config line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl From<ConfigError> for zigup_core::Error {
    fn from(e: ConfigError) -> Self {
        use zigup_core::Error;
        match e {
            ConfigError::NoConfigDirectory => Error::NoConfigDirectory,
            ConfigError::NoDataDirectory => Error::NoDataDirectory,
            ConfigError::NoCacheDirectory => Error::NoCacheDirectory,
            ConfigError::Read(source) => Error::Io {
                message: "failed to read config".into(),
                path: None,
                source,
            },
            ConfigError::Write(source) => Error::Io {
                message: "failed to write config".into(),
                path: None,
                source,
            },
            ConfigError::Parse { line, message } => {
                Error::parse(format!("config line {line}: {message}"))
            }
        }
    }
}

/// Contents of `zigup.conf`. Unset keys fall back to platform defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub install_dir: Option<PathBuf>,
    pub zig_symlink: Option<PathBuf>,
    pub zls_symlink: Option<PathBuf>,
}

impl ConfigFile {
    /// Parse the line-oriented `key=value` format.
    ///
    /// Blank lines and `#` comments are tolerated. An unknown key or a
    /// line without `=` is an error.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let mut config = ConfigFile::default();
        for (idx, raw) in s.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse {
                    line: idx + 1,
                    message: format!("expected key=value, got '{}'", line),
                });
            };
            let value = PathBuf::from(value.trim());
            match key.trim() {
                "install_dir" => config.install_dir = Some(value),
                "zig_symlink" => config.zig_symlink = Some(value),
                "zls_symlink" => config.zls_symlink = Some(value),
                other => {
                    return Err(ConfigError::Parse {
                        line: idx + 1,
                        message: format!("unknown key '{}'", other),
                    });
                }
            }
        }
        Ok(config)
    }

    /// Render back to the `key=value` format. Only set keys are written.
    pub fn print(&self) -> String {
        let mut out = String::new();
        if let Some(ref dir) = self.install_dir {
            let _ = writeln!(out, "install_dir={}", dir.display());
        }
        if let Some(ref path) = self.zig_symlink {
            let _ = writeln!(out, "zig_symlink={}", path.display());
        }
        if let Some(ref path) = self.zls_symlink {
            let _ = writeln!(out, "zls_symlink={}", path.display());
        }
        out
    }

    /// Read a config file, treating a missing file as all-defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                Ok(ConfigFile::default())
            }
            Err(e) => Err(ConfigError::Read(e)),
        }
    }

    /// Write the config file, creating parent directories as needed.
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }
        std::fs::write(path, self.print()).map_err(ConfigError::Write)
    }
}

/// Fully resolved paths for one invocation. All paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Directory holding `zig-<version>` installs and the `zls-repo` mirror.
    pub install_dir: PathBuf,
    /// Path of the default-toolchain pointer for `zig`.
    pub zig_link_path: PathBuf,
    /// Path of the default-toolchain pointer for `zls`.
    pub zls_link_path: PathBuf,
}

/// Per-invocation overrides from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub install_dir: Option<PathBuf>,
    pub zig_symlink: Option<PathBuf>,
    pub zls_symlink: Option<PathBuf>,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "zigup", "zigup")
}

/// Path of `zigup.conf`, honoring the `ZIGUP_CONFIG_FILE` override.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(EnvVars::ZIGUP_CONFIG_FILE) {
        return Ok(PathBuf::from(path));
    }
    let dirs = project_dirs().ok_or(ConfigError::NoConfigDirectory)?;
    Ok(dirs.config_dir().join("zigup.conf"))
}

/// Directory for cached release indexes.
///
/// - Linux: `~/.cache/zigup`
/// - macOS: `~/Library/Caches/org.zigup.zigup`
/// - Windows: `%LOCALAPPDATA%\zigup\zigup\cache`
pub fn cache_dir() -> Result<PathBuf, ConfigError> {
    let dirs = project_dirs().ok_or(ConfigError::NoCacheDirectory)?;
    Ok(dirs.cache_dir().to_path_buf())
}

/// Default install directory in the platform data directory.
pub fn default_install_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var(EnvVars::ZIGUP_INSTALL_DIR) {
        return Ok(PathBuf::from(dir));
    }
    let dirs = project_dirs().ok_or(ConfigError::NoDataDirectory)?;
    Ok(dirs.data_dir().to_path_buf())
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&path))
            .unwrap_or(path)
    }
}

fn exe_name(stem: &str) -> String {
    format!("{}{}", stem, std::env::consts::EXE_SUFFIX)
}

/// Load the config file and apply CLI overrides and platform defaults.
pub fn resolve(overrides: &Overrides) -> Result<ResolvedConfig, ConfigError> {
    let file = ConfigFile::from_file(&config_file_path()?)?;
    resolve_with(&file, overrides)
}

/// Resolution against an already-loaded file, for tests.
pub fn resolve_with(
    file: &ConfigFile,
    overrides: &Overrides,
) -> Result<ResolvedConfig, ConfigError> {
    let install_dir = overrides
        .install_dir
        .clone()
        .or_else(|| file.install_dir.clone())
        .map(Ok)
        .unwrap_or_else(default_install_dir)?;
    let install_dir = absolutize(install_dir);

    let zig_link_path = absolutize(
        overrides
            .zig_symlink
            .clone()
            .or_else(|| file.zig_symlink.clone())
            .unwrap_or_else(|| install_dir.join(exe_name("zig"))),
    );
    let zls_link_path = absolutize(
        overrides
            .zls_symlink
            .clone()
            .or_else(|| file.zls_symlink.clone())
            .unwrap_or_else(|| install_dir.join(exe_name("zls"))),
    );

    Ok(ResolvedConfig {
        install_dir,
        zig_link_path,
        zls_link_path,
    })
}

/// Keys that `zigup set-*` can persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    InstallDir,
    ZigSymlink,
    ZlsSymlink,
}

/// Persist one key to `zigup.conf`, keeping the other keys as they were.
pub fn persist(key: ConfigKey, value: &Path) -> Result<PathBuf, ConfigError> {
    let path = config_file_path()?;
    let mut file = ConfigFile::from_file(&path)?;
    let value = absolutize(value.to_path_buf());
    match key {
        ConfigKey::InstallDir => file.install_dir = Some(value),
        ConfigKey::ZigSymlink => file.zig_symlink = Some(value),
        ConfigKey::ZlsSymlink => file.zls_symlink = Some(value),
    }
    file.to_file(&path)?;
    Ok(path)
}
