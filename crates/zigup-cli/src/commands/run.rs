//! Run an installed compiler.

use super::{context, resolve_id};
use anyhow::Result;
use std::ffi::OsString;
use zigup_config::Overrides;
use zigup_core::{Error, ExitCode};
use zigup_toolchain::{VersionSpec, lifecycle};
use zigup_ui::Output;

pub async fn run(
    version: &str,
    args: Vec<OsString>,
    overrides: &Overrides,
    output: &Output,
) -> Result<i32> {
    match go(version, args, overrides).await {
        Ok(code) => Ok(code),
        Err(e) => {
            output.print_error(&e);
            Ok(ExitCode::UserError.into())
        }
    }
}

async fn go(version: &str, args: Vec<OsString>, overrides: &Overrides) -> Result<i32, Error> {
    let spec: VersionSpec = version.parse()?;
    let (_config, layout) = context(overrides)?;
    let id = resolve_id(spec, &layout).await?;

    let status = lifecycle::run(&layout, &id, args).await?;
    Ok(status.propagate())
}
