//! Read or set the default toolchain.

use super::{context, resolve_id};
use anyhow::Result;
use zigup_config::Overrides;
use zigup_core::{Error, ExitCode, Fix};
use zigup_toolchain::{ID_PREFIX, VersionSpec, read_default, set_default};
use zigup_ui::Output;

pub async fn run(version: Option<&str>, overrides: &Overrides, output: &Output) -> Result<i32> {
    match go(version, overrides, output).await {
        Ok(code) => Ok(code),
        Err(e) => {
            output.print_error(&e);
            Ok(ExitCode::UserError.into())
        }
    }
}

async fn go(
    version: Option<&str>,
    overrides: &Overrides,
    output: &Output,
) -> Result<i32, Error> {
    let (config, layout) = context(overrides)?;

    let Some(version) = version else {
        match read_default(&config.zig_link_path)? {
            Some(id) => output.result(&id),
            None => output.info("no default compiler is set"),
        }
        return Ok(0);
    };

    let spec: VersionSpec = version.parse()?;
    let id = resolve_id(spec, &layout).await?;

    if !layout.is_installed(&id) {
        return Err(Error::NotInstalled {
            fixes: vec![Fix::with_command(
                format!("download {} first", id),
                format!("zigup fetch {}", &id[ID_PREFIX.len()..]),
            )],
            id,
        });
    }

    set_default(&layout, &id, &config.zig_link_path, &config.zls_link_path)?;
    output.status("Default", &id);
    Ok(0)
}
