//! List installed versions.

use super::context;
use anyhow::Result;
use zigup_config::Overrides;
use zigup_core::{Error, ExitCode};
use zigup_toolchain::{lifecycle, read_default};
use zigup_ui::Output;

pub async fn run(overrides: &Overrides, output: &Output) -> Result<i32> {
    match go(overrides, output) {
        Ok(code) => Ok(code),
        Err(e) => {
            output.print_error(&e);
            Ok(ExitCode::UserError.into())
        }
    }
}

fn go(overrides: &Overrides, output: &Output) -> Result<i32, Error> {
    let (config, layout) = context(overrides)?;
    let default_id = read_default(&config.zig_link_path)?;

    let entries = lifecycle::list(&layout, default_id.as_deref())?;
    if entries.is_empty() {
        output.info("no Zig versions installed");
        return Ok(0);
    }

    for entry in entries {
        let mut line = entry.id;
        if entry.keep {
            line.push_str(" [keep]");
        }
        if entry.is_default {
            line.push_str(" [default]");
        }
        output.result(&line);
    }
    Ok(0)
}
