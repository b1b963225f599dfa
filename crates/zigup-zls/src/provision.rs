//! Driving a zls build against an installed compiler.

use crate::repo::{checkout_detached, open_or_clone, resolve_commit};
use std::path::Path;
use tracing::{debug, info};
use zigup_core::{CommandRunner, Error, ExitStatus, ZigVersion};
use zigup_toolchain::{ID_PREFIX, InstallLayout, VersionSpec, exe_name};
use zigup_ui::Prompter;

/// What provisioning did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A fresh zls was built and installed.
    Built,
    /// A matching zls was already present.
    AlreadyPresent,
    /// The user declined a rebuild.
    Skipped,
}

/// Build zls for the install `id` and place it beside the compiler.
///
/// An existing `zls` binary satisfies a release version outright; for
/// development builds the user is asked (default no) whether to rebuild,
/// since the matching zls commit moves with the compiler.
pub async fn provision(
    layout: &InstallLayout,
    id: &str,
    spec: &VersionSpec,
    prompter: &mut dyn Prompter,
) -> Result<ProvisionOutcome, Error> {
    let version = &id[ID_PREFIX.len().min(id.len())..];
    let zls_bin = layout.zls_bin(id);

    if zls_bin.is_file() {
        let is_release = version
            .parse::<ZigVersion>()
            .map(|v| !v.is_prerelease())
            .unwrap_or(false);
        if is_release {
            debug!("zls for {} already present", id);
            return Ok(ProvisionOutcome::AlreadyPresent);
        }
        let rebuild = prompter
            .confirm("zls already exists for this version; rebuild?", Some(false))
            .unwrap_or(false);
        if !rebuild {
            return Ok(ProvisionOutcome::Skipped);
        }
    }

    let repo_path = layout.zls_repo();
    let oid = {
        let repo = open_or_clone(&repo_path, prompter)?;
        let spec_is_master = matches!(spec, VersionSpec::Master);
        let oid = resolve_commit(&repo, version, spec_is_master, prompter)?;
        checkout_detached(&repo, oid)?;
        oid
        // The repository handle closes here, before the build walks the
        // working tree.
    };
    info!("Building zls at {}", oid);

    build_zls(&layout.compiler_bin(id), &repo_path).await?;

    let built = repo_path.join("zig-out").join("bin").join(exe_name("zls"));
    std::fs::copy(&built, &zls_bin)
        .map_err(|e| Error::io("failed to install built zls", &built, e))?;

    info!("Installed zls for {}", id);
    Ok(ProvisionOutcome::Built)
}

/// Run `zig build --release=safe` in the zls working tree.
async fn build_zls(compiler_bin: &Path, repo_path: &Path) -> Result<(), Error> {
    use std::ffi::OsStr;

    let runner = CommandRunner::new().with_working_dir(repo_path);
    let status = runner
        .status(
            compiler_bin.as_os_str(),
            [OsStr::new("build"), OsStr::new("--release=safe")],
        )
        .await?;

    match status {
        ExitStatus::Code(0) => Ok(()),
        ExitStatus::Code(code) => Err(Error::FailedCompile {
            exit_code: Some(code),
            stderr: String::new(),
        }),
        ExitStatus::Abnormal => Err(Error::FailedCompile {
            exit_code: None,
            stderr: String::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zigup_ui::ScriptedPrompter;

    fn layout_with_zls(id: &str) -> (tempfile::TempDir, InstallLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path());
        std::fs::create_dir_all(layout.compiler_dir(id)).unwrap();
        std::fs::write(layout.zls_bin(id), b"#!zls").unwrap();
        (dir, layout)
    }

    #[tokio::test]
    async fn test_release_with_existing_zls_is_satisfied() {
        let (_dir, layout) = layout_with_zls("zig-0.13.0");
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

        let outcome = provision(
            &layout,
            "zig-0.13.0",
            &VersionSpec::Tagged(ZigVersion::new(0, 13, 0)),
            &mut prompter,
        )
        .await
        .unwrap();
        assert_eq!(outcome, ProvisionOutcome::AlreadyPresent);
        assert!(prompter.asked.is_empty());
    }

    #[tokio::test]
    async fn test_dev_build_prompts_and_default_declines() {
        let (_dir, layout) = layout_with_zls("zig-0.14.0-dev.121+ab3c1f2d9");
        let mut prompter = ScriptedPrompter::new([""]);

        let outcome = provision(
            &layout,
            "zig-0.14.0-dev.121+ab3c1f2d9",
            &VersionSpec::Master,
            &mut prompter,
        )
        .await
        .unwrap();
        assert_eq!(outcome, ProvisionOutcome::Skipped);
        assert_eq!(prompter.asked.len(), 1);
    }
}
