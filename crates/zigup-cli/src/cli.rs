//! CLI argument parsing.

use crate::styles::STYLES;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use zigup_core::EnvVars;

/// zigup - a version manager for the Zig compiler and language server
#[derive(Parser, Debug)]
#[command(name = "zigup")]
#[command(author, version, about = "Download and manage Zig compilers")]
#[command(styles = STYLES)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "Run `zigup <VERSION>` to install a version and make it the default.\n\
    VERSION may be a semver like 0.13.0, a dev build like 0.14.0-dev.121+ab3c1f2d9,\n\
    a Mach version like 0.3.0-mach, or one of: stable, master, mach-latest,\n\
    latest-installed, stable-installed.")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Version to install and set as the default
    #[arg(id = "zig_version")]
    pub version: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all commands.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Directory holding the installed compilers
    #[arg(long, global = true, value_name = "DIR")]
    pub install_dir: Option<PathBuf>,

    /// Path of the default zig pointer
    #[arg(long, global = true, value_name = "PATH")]
    pub zig_symlink: Option<PathBuf>,

    /// Path of the default zls pointer
    #[arg(long, global = true, value_name = "PATH")]
    pub zls_symlink: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, env = EnvVars::ZIGUP_VERBOSE)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a compiler without changing the default
    Fetch {
        /// Version to download
        version: String,
    },

    /// Print the default version, or set it
    Default {
        /// Version to make the default
        version: Option<String>,
    },

    /// List installed versions
    List,

    /// Protect a version from `clean outdated`
    Keep {
        /// Version to keep
        version: String,
    },

    /// Remove one version, or `outdated` to prune old ones
    Clean {
        /// Version to remove, or the literal `outdated`
        version: String,
    },

    /// Run an installed compiler with the given arguments
    Run {
        /// Version to run
        version: String,

        /// Arguments forwarded to the compiler
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },

    /// Persist the install directory in zigup.conf
    SetInstallDir {
        /// New install directory
        dir: PathBuf,
    },

    /// Persist the default zig pointer path in zigup.conf
    SetZigSymlink {
        /// New pointer path
        path: PathBuf,
    },

    /// Persist the default zls pointer path in zigup.conf
    SetZlsSymlink {
        /// New pointer path
        path: PathBuf,
    },

    /// Refresh the cached ziglang.org release index
    FetchIndex,

    /// Refresh the cached Mach release index
    FetchMachIndex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_version_parses() {
        let cli = Cli::parse_from(["zigup", "0.13.0"]);
        assert_eq!(cli.version.as_deref(), Some("0.13.0"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_forwards_hyphen_args() {
        let cli = Cli::parse_from(["zigup", "run", "0.13.0", "build", "--release=fast"]);
        match cli.command {
            Some(Commands::Run { version, args }) => {
                assert_eq!(version, "0.13.0");
                assert_eq!(args, ["build", "--release=fast"]);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_before_subcommand() {
        let cli = Cli::parse_from(["zigup", "--install-dir", "/tmp/x", "list"]);
        assert_eq!(cli.global.install_dir.as_deref(), Some("/tmp/x".as_ref()));
        assert!(matches!(cli.command, Some(Commands::List)));
    }

    #[test]
    fn test_no_arguments_is_valid() {
        let cli = Cli::parse_from(["zigup"]);
        assert!(cli.version.is_none());
        assert!(cli.command.is_none());
    }
}
