//! Persist settings to zigup.conf.

use anyhow::Result;
use std::path::Path;
use zigup_config::ConfigKey;
use zigup_core::ExitCode;
use zigup_ui::Output;

pub fn run(key: ConfigKey, value: &Path, output: &Output) -> Result<i32> {
    match zigup_config::persist(key, value) {
        Ok(path) => {
            output.status("Wrote", &path.display().to_string());
            Ok(0)
        }
        Err(e) => {
            output.print_error(&e.into());
            Ok(ExitCode::UserError.into())
        }
    }
}
