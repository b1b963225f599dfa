//! Command implementations.

mod clean;
mod config;
mod default;
mod index;
mod install;
mod keep;
mod list;
mod run;

use crate::cli::{Cli, Commands, GlobalArgs};
use anyhow::Result;
use clap::CommandFactory;
use zigup_config::{ConfigKey, Overrides, ResolvedConfig};
use zigup_core::{Error, ExitCode};
use zigup_index::{IndexKind, IndexStore};
use zigup_toolchain::{ID_PREFIX, InstallLayout, VersionResolver, VersionSpec};
use zigup_ui::{Output, Verbosity};

fn overrides(global: &GlobalArgs) -> Overrides {
    Overrides {
        install_dir: global.install_dir.clone(),
        zig_symlink: global.zig_symlink.clone(),
        zls_symlink: global.zls_symlink.clone(),
    }
}

/// Resolve the config file, flags, and platform defaults for this call.
fn context(overrides: &Overrides) -> Result<(ResolvedConfig, InstallLayout), Error> {
    let config = zigup_config::resolve(overrides)?;
    tracing::debug!("install dir: {}", config.install_dir.display());
    let layout = InstallLayout::new(&config.install_dir);
    Ok((config, layout))
}

/// Resolve a spec to its install id, staying offline where possible.
///
/// Exact versions map to their id directly; installed-only aliases scan the
/// install dir; the channel aliases go through the index.
async fn resolve_id(spec: VersionSpec, layout: &InstallLayout) -> Result<String, Error> {
    if let VersionSpec::Tagged(v) | VersionSpec::Dev(v) = &spec {
        return Ok(format!("{ID_PREFIX}{v}"));
    }
    let mut store = IndexStore::new()?;
    let mut resolver = VersionResolver::new(spec, &mut store, layout);
    let id = resolver.id().await.map_err(Error::from)?;
    Ok(id.to_string())
}

/// Run the CLI command.
pub async fn run(cli: Cli) -> Result<i32> {
    let output = Output::with_verbosity(if cli.global.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    });

    let overrides = overrides(&cli.global);

    match cli.command {
        None => match cli.version {
            Some(version) => install::run(&version, true, &overrides, &output).await,
            None => {
                Cli::command().print_help()?;
                Ok(ExitCode::UserError.into())
            }
        },
        Some(Commands::Fetch { version }) => {
            install::run(&version, false, &overrides, &output).await
        }
        Some(Commands::Default { version }) => {
            default::run(version.as_deref(), &overrides, &output).await
        }
        Some(Commands::List) => list::run(&overrides, &output).await,
        Some(Commands::Keep { version }) => keep::run(&version, &overrides, &output).await,
        Some(Commands::Clean { version }) => clean::run(&version, &overrides, &output).await,
        Some(Commands::Run { version, args }) => {
            run::run(&version, args, &overrides, &output).await
        }
        Some(Commands::SetInstallDir { dir }) => {
            config::run(ConfigKey::InstallDir, &dir, &output)
        }
        Some(Commands::SetZigSymlink { path }) => {
            config::run(ConfigKey::ZigSymlink, &path, &output)
        }
        Some(Commands::SetZlsSymlink { path }) => {
            config::run(ConfigKey::ZlsSymlink, &path, &output)
        }
        Some(Commands::FetchIndex) => index::run(IndexKind::Zig, &output).await,
        Some(Commands::FetchMachIndex) => index::run(IndexKind::Mach, &output).await,
    }
}
