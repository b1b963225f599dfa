//! The install path shared by `zigup <VERSION>` and `zigup fetch`.

use super::context;
use anyhow::Result;
use zigup_config::Overrides;
use zigup_core::{Error, ExitCode};
use zigup_index::IndexStore;
use zigup_toolchain::{VersionResolver, VersionSpec};
use zigup_ui::{Output, Progress, StdPrompter};
use zigup_zls::ProvisionOutcome;

pub async fn run(
    version: &str,
    set_default: bool,
    overrides: &Overrides,
    output: &Output,
) -> Result<i32> {
    match go(version, set_default, overrides, output).await {
        Ok(code) => Ok(code),
        Err(e) => {
            output.print_error(&e);
            Ok(ExitCode::UserError.into())
        }
    }
}

async fn go(
    version: &str,
    set_default: bool,
    overrides: &Overrides,
    output: &Output,
) -> Result<i32, Error> {
    let spec: VersionSpec = version.parse()?;
    let (config, layout) = context(overrides)?;

    let mut store = IndexStore::new()?;
    let mut resolver = VersionResolver::new(spec.clone(), &mut store, &layout);
    let record = resolver.record().await.map_err(Error::from)?.clone();
    output.verbose(&format!("{} resolved to {}", spec, record.url));

    let mut bar: Option<Progress> = None;
    let fresh = zigup_toolchain::install(&layout, &record.id, &record.url, |bytes, total| {
        if bar.is_none()
            && let Some(total) = total
        {
            bar = Some(Progress::new(total, format!("Downloading {}", record.id)));
        }
        if let Some(ref bar) = bar {
            bar.set_position(bytes);
        }
    })
    .await?;
    if let Some(bar) = bar {
        bar.finish_clear();
    }

    if fresh {
        output.status("Installed", &record.id);
    } else {
        output.status("Unchanged", &format!("{} was already installed", record.id));
    }

    // zls is advisory: a failed build leaves the compiler usable.
    let mut prompter = StdPrompter::new();
    match zigup_zls::provision(&layout, &record.id, &spec, &mut prompter).await {
        Ok(ProvisionOutcome::Built) => output.status("Built", "zls"),
        Ok(ProvisionOutcome::AlreadyPresent) | Ok(ProvisionOutcome::Skipped) => {}
        Err(e) => output.warn(&format!("zls unavailable for {}: {}", record.id, e)),
    }

    if set_default {
        zigup_toolchain::set_default(
            &layout,
            &record.id,
            &config.zig_link_path,
            &config.zls_link_path,
        )?;
        output.status("Default", &record.id);
    }

    Ok(0)
}
