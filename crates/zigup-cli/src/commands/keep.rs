//! Protect an install from `clean outdated`.

use super::{context, resolve_id};
use anyhow::Result;
use zigup_config::Overrides;
use zigup_core::{Error, ExitCode};
use zigup_toolchain::{VersionSpec, lifecycle};
use zigup_ui::Output;

pub async fn run(version: &str, overrides: &Overrides, output: &Output) -> Result<i32> {
    match go(version, overrides, output).await {
        Ok(code) => Ok(code),
        Err(e) => {
            output.print_error(&e);
            Ok(ExitCode::UserError.into())
        }
    }
}

async fn go(version: &str, overrides: &Overrides, output: &Output) -> Result<i32, Error> {
    let spec: VersionSpec = version.parse()?;
    let (_config, layout) = context(overrides)?;
    let id = resolve_id(spec, &layout).await?;

    lifecycle::keep(&layout, &id)?;
    output.status("Kept", &id);
    Ok(0)
}
