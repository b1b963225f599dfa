//! Remove installs.

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
    let (_config, layout) = context(overrides)?;

    if version == "outdated" {
        let removed = lifecycle::clean_outdated(&layout)?;
        if removed.is_empty() {
            output.info("nothing to clean");
        } else {
            for id in removed {
                output.status("Removed", &id);
            }
        }
        return Ok(0);
    }

    let spec: VersionSpec = version.parse()?;
    let id = resolve_id(spec, &layout).await?;
    if lifecycle::clean(&layout, &id)? {
        output.status("Removed", &id);
    } else {
        output.info(&format!("{} was not installed", id));
    }
    Ok(0)
}
