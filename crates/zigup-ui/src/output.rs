//! Output formatting for the zigup CLI.

use crate::style::Style;
use std::io::{self, Write};
use zigup_core::error::{Error, Fix};

/// Verbosity level for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Verbose output
    Verbose,
}

/// Output handler for consistent CLI output.
///
/// Status and diagnostics go to stderr; stdout is reserved for command
/// results (`zigup default`, `zigup list`) so they stay scriptable.
#[derive(Debug, Clone)]
pub struct Output {
    verbosity: Verbosity,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output handler with default verbosity.
    pub fn new() -> Self {
        Self {
            verbosity: Verbosity::Normal,
        }
    }

    /// Create an output handler with specified verbosity.
    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Check if verbose output is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbosity >= Verbosity::Verbose
    }

    /// Print a status message with a step title.
    pub fn status(&self, action: &str, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{:>12} {}", Style::bold(Style::success(action)), message);
        }
    }

    /// Print an info message.
    pub fn info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", message);
        }
    }

    /// Print a warning message.
    pub fn warn(&self, message: &str) {
        eprintln!("{}: {}", Style::warning("warning"), message);
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        eprintln!("{}: {}", Style::error("error"), message);
    }

    /// Print verbose output (only shown in verbose mode).
    pub fn verbose(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{}", Style::dim(message));
        }
    }

    /// Print a command result line to stdout.
    pub fn result(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a structured error with fixes.
    pub fn print_error(&self, error: &Error) {
        eprintln!("{}: {}", Style::error("error"), error);

        match error {
            Error::Io { path: Some(p), .. } | Error::ParseFailed { path: Some(p), .. } => {
                eprintln!("  {} {}", Style::dim("-->"), p.display());
            }
            Error::CommandFailed { stderr, .. } if !stderr.is_empty() => {
                for line in stderr.lines().take(8) {
                    eprintln!("  {} {}", Style::dim("|"), line);
                }
            }
            _ => {}
        }

        for fix in error.fixes() {
            self.print_fix(fix);
        }
    }

    /// Print a fix suggestion.
    pub fn print_fix(&self, fix: &Fix) {
        if let Some(ref cmd) = fix.command {
            eprintln!("{}: Run `{}`", Style::info("fix"), Style::command(cmd));
            if fix.description != *cmd {
                eprintln!("      {}", Style::dim(&fix.description));
            }
        } else {
            eprintln!("{}: {}", Style::info("fix"), fix.description);
        }
    }

    /// Print a list item.
    pub fn list_item(&self, key: &str, value: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("  {}: {}", Style::dim(key), value);
        }
    }

    /// Flush stdout and stderr.
    pub fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}
