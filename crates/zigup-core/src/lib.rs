//! Core types for zigup.
//!
//! This crate provides the shared error type, Zig version parsing, and
//! child-process execution utilities used across all zigup crates.

pub mod command;
pub mod env;
pub mod error;
pub mod version;

pub use command::{CommandOutput, CommandRunner, ExitStatus};
pub use env::EnvVars;
pub use error::{DownloadStage, Error, Fix, Result};
pub use version::{VersionParseError, ZigVersion};

/// Exit codes for the zigup CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// User error (bad argument, missing install, broken environment)
    UserError = 1,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
