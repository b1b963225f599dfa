//! Error types for zigup.

use std::path::PathBuf;

/// Result type alias using zigup Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Which stage of an HTTP download failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStage {
    /// The URL could not be parsed.
    Url,
    /// The connection could not be established.
    Connect,
    /// Sending the request or receiving the response failed.
    Transfer,
    /// Writing the response body to its destination failed.
    Write,
    /// The server answered with a non-success status.
    Status,
}

impl std::fmt::Display for DownloadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DownloadStage::Url => "invalid url",
            DownloadStage::Connect => "connect",
            DownloadStage::Transfer => "send/receive",
            DownloadStage::Write => "write",
            DownloadStage::Status => "http status",
        };
        f.write_str(s)
    }
}

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct Fix {
    /// Description of what this fix does
    pub description: String,
    /// Command to run, if applicable
    pub command: Option<String>,
}

impl Fix {
    /// Create a fix with just a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: None,
        }
    }

    /// Create a fix with a command.
    pub fn with_command(description: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: Some(command.into()),
        }
    }
}

/// Structured error type for zigup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid version spec: {spec}")]
    InvalidVersion { spec: String },

    #[error("unsupported system: {arch}-{os}")]
    UnsupportedSystem { os: String, arch: String },

    #[error("no Zig versions are installed")]
    NoInstalledVersions { fixes: Vec<Fix> },

    #[error("{id} is not installed")]
    NotInstalled { id: String, fixes: Vec<Fix> },

    #[error("could not determine the platform data directory")]
    NoDataDirectory,

    #[error("could not determine the platform cache directory")]
    NoCacheDirectory,

    #[error("could not determine the platform config directory")]
    NoConfigDirectory,

    #[error("download failed ({stage}): {url}")]
    DownloadFailed {
        stage: DownloadStage,
        url: String,
        detail: String,
    },

    #[error("parse error: {message}")]
    ParseFailed {
        message: String,
        path: Option<PathBuf>,
    },

    #[error("unknown archive extension: {basename}")]
    UnknownArchiveExtension { basename: String },

    #[error("zls build failed")]
    FailedCompile {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("git clone failed: {message}")]
    FailedClone { message: String, fixes: Vec<Fix> },

    #[error("git fetch failed: {message}")]
    FailedFetch { message: String, fixes: Vec<Fix> },

    #[error("git checkout failed: {message}")]
    FailedCheckout { message: String, fixes: Vec<Fix> },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("command failed: {command}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        fixes: Vec<Fix>,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// True for errors caused by user input or the user's environment,
    /// as opposed to bugs or remote failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidVersion { .. }
                | Error::NoInstalledVersions { .. }
                | Error::NotInstalled { .. }
                | Error::NoDataDirectory
                | Error::NoConfigDirectory
        )
    }

    /// Get suggested fixes for this error.
    pub fn fixes(&self) -> &[Fix] {
        match self {
            Error::NoInstalledVersions { fixes }
            | Error::NotInstalled { fixes, .. }
            | Error::FailedClone { fixes, .. }
            | Error::FailedFetch { fixes, .. }
            | Error::FailedCheckout { fixes, .. }
            | Error::CommandFailed { fixes, .. } => fixes,
            _ => &[],
        }
    }

    /// Create an I/O error with context.
    pub fn io(message: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            message: message.into(),
            path: Some(path.into()),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Error::ParseFailed {
            message: message.into(),
            path: None,
        }
    }

    /// Create a parse error with the offending file.
    pub fn parse_at(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Error::ParseFailed {
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_constructors() {
        let fix = Fix::new("delete the directory");
        assert!(fix.command.is_none());

        let fix = Fix::with_command("install a version", "zigup 0.13.0");
        assert_eq!(fix.command.as_deref(), Some("zigup 0.13.0"));
    }

    #[test]
    fn test_user_error_classification() {
        assert!(Error::InvalidVersion { spec: "x".into() }.is_user_error());
        assert!(!Error::NoCacheDirectory.is_user_error());
        assert!(
            !Error::DownloadFailed {
                stage: DownloadStage::Connect,
                url: "https://example.invalid".into(),
                detail: "refused".into(),
            }
            .is_user_error()
        );
    }

    #[test]
    fn test_download_stage_display() {
        let err = Error::DownloadFailed {
            stage: DownloadStage::Status,
            url: "https://ziglang.org/x".into(),
            detail: "404".into(),
        };
        let text = err.to_string();
        assert!(text.contains("http status"));
        assert!(text.contains("ziglang.org"));
    }
}
