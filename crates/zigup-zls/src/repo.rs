//! Git operations on the zls source mirror.

use crate::certs::describe_into;
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::cert::Cert;
use git2::{CertificateCheckStatus, FetchOptions, Oid, RemoteCallbacks, Repository};
use std::cell::RefCell;
use std::path::Path;
use tracing::{debug, info};
use zigup_core::{Error, Fix};
use zigup_ui::{Prompter, Spinner};

/// Upstream repository for the Zig language server.
pub const ZLS_URL: &str = "https://github.com/zigtools/zls.git";

/// Whether the clone/fetch callbacks should trust certificates the
/// transport could not validate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrustPolicy {
    Default,
    TrustAnyway,
}

/// Details of the last certificate seen, captured for the trust prompt.
#[derive(Default)]
struct CertDetails {
    text: RefCell<String>,
}

fn callbacks<'a>(
    policy: TrustPolicy,
    details: &'a CertDetails,
    spinner: &'a Spinner,
) -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(move |stats| {
        spinner.set_message(format!(
            "zls-repo: received {}/{} objects",
            stats.received_objects(),
            stats.total_objects()
        ));
        true
    });
    callbacks.certificate_check(move |cert: &Cert<'_>, host: &str| {
        describe_into(&mut details.text.borrow_mut(), cert, host);
        match policy {
            // Let the transport's own validation decide.
            TrustPolicy::Default => Ok(CertificateCheckStatus::CertificatePassthrough),
            TrustPolicy::TrustAnyway => Ok(CertificateCheckStatus::CertificateOk),
        }
    });
    callbacks
}

fn is_certificate_error(e: &git2::Error) -> bool {
    matches!(e.class(), git2::ErrorClass::Ssl)
        || matches!(e.code(), git2::ErrorCode::Certificate)
}

/// Run a clone or fetch, with a certificate-trust prompt on the way out.
///
/// When the transport rejects a certificate, the captured details are shown
/// and the user decides (no default) whether to retry trusting it.
fn with_trust_prompt<T>(
    prompter: &mut dyn Prompter,
    mut attempt: impl FnMut(TrustPolicy, &CertDetails, &Spinner) -> Result<T, git2::Error>,
) -> Result<T, git2::Error> {
    let details = CertDetails::default();
    let spinner = Spinner::new("zls-repo: connecting");
    let result = attempt(TrustPolicy::Default, &details, &spinner);
    spinner.finish_clear();

    let e = match result {
        Ok(value) => return Ok(value),
        Err(e) if !is_certificate_error(&e) => return Err(e),
        Err(e) => e,
    };

    eprintln!("{}", details.text.borrow());
    match prompter.confirm("continue with this untrusted certificate?", None) {
        Ok(true) => {
            let spinner = Spinner::new("zls-repo: retrying");
            let result = attempt(TrustPolicy::TrustAnyway, &details, &spinner);
            spinner.finish_clear();
            result
        }
        _ => Err(e),
    }
}

fn repo_fix(path: &Path, action: &str) -> Vec<Fix> {
    vec![Fix::new(format!(
        "if the repository is broken, delete {} and {} again",
        path.display(),
        action
    ))]
}

/// Open the mirror at `path`, or clone it from upstream.
///
/// An existing repo is optionally (default yes) refreshed from `origin`.
pub fn open_or_clone(path: &Path, prompter: &mut dyn Prompter) -> Result<Repository, Error> {
    if path.exists() {
        let repo = Repository::open(path).map_err(|e| Error::FailedFetch {
            message: format!("could not open {}: {}", path.display(), e.message()),
            fixes: repo_fix(path, "fetch"),
        })?;

        let fetch = prompter
            .confirm("fetch the latest zls commits?", Some(true))
            .unwrap_or(true);
        if fetch {
            fetch_origin(&repo, prompter).map_err(|e| Error::FailedFetch {
                message: e.message().to_string(),
                fixes: repo_fix(path, "fetch"),
            })?;
        }
        return Ok(repo);
    }

    info!("Cloning {} into {}", ZLS_URL, path.display());
    with_trust_prompt(prompter, |policy, details, spinner| {
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks(policy, details, spinner));
        RepoBuilder::new()
            .fetch_options(fetch_options)
            .clone(ZLS_URL, path)
    })
    .map_err(|e| Error::FailedClone {
        message: e.message().to_string(),
        fixes: repo_fix(path, "clone"),
    })
}

fn fetch_origin(repo: &Repository, prompter: &mut dyn Prompter) -> Result<(), git2::Error> {
    debug!("Fetching origin");
    with_trust_prompt(prompter, |policy, details, spinner| {
        let mut remote = repo.find_remote("origin")?;
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks(policy, details, spinner));
        // Empty refspec list means the remote's configured refspecs.
        remote.fetch(&[] as &[&str], Some(&mut fetch_options), None)
    })
}

/// Decide which commit to build.
///
/// In order: the version as a tag/branch name; `origin/master` (prompted,
/// default yes) when the user asked for master; finally an interactive
/// loop accepting `master`, a full SHA, or any parseable revspec.
pub fn resolve_commit(
    repo: &Repository,
    version: &str,
    spec_is_master: bool,
    prompter: &mut dyn Prompter,
) -> Result<Oid, Error> {
    if let Some(oid) = lookup_reference(repo, version) {
        debug!("zls reference '{}' found", version);
        return Ok(oid);
    }

    if spec_is_master {
        let use_master = prompter
            .confirm("no matching zls tag; build origin/master?", Some(true))
            .unwrap_or(true);
        if use_master {
            if let Some(oid) = lookup_revspec(repo, "origin/master") {
                return Ok(oid);
            }
        }
    }

    loop {
        let answer = prompter
            .line("zls version to build (master, a commit SHA, or a revspec)")
            .map_err(|e| Error::FailedCheckout {
                message: format!("no usable zls revision: {}", e),
                fixes: vec![],
            })?;
        let candidate = if answer == "master" {
            "origin/master".to_string()
        } else {
            answer
        };

        if let Ok(oid) = Oid::from_str(&candidate) {
            if repo.find_commit(oid).is_ok() {
                return Ok(oid);
            }
        }
        if let Some(oid) = lookup_revspec(repo, &candidate) {
            return Ok(oid);
        }
        eprintln!("'{}' is not a known zls revision", candidate);
    }
}

fn lookup_reference(repo: &Repository, short_name: &str) -> Option<Oid> {
    repo.resolve_reference_from_short_name(short_name)
        .ok()?
        .peel_to_commit()
        .ok()
        .map(|c| c.id())
}

fn lookup_revspec(repo: &Repository, spec: &str) -> Option<Oid> {
    repo.revparse_single(spec)
        .ok()?
        .peel_to_commit()
        .ok()
        .map(|c| c.id())
}

/// Detached-HEAD checkout of one commit.
pub fn checkout_detached(repo: &Repository, oid: Oid) -> Result<(), Error> {
    let checkout = || -> Result<(), git2::Error> {
        let commit = repo.find_commit(oid)?;
        repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))?;
        repo.set_head_detached(oid)
    };
    checkout().map_err(|e| Error::FailedCheckout {
        message: format!("checkout of {} failed: {}", oid, e.message()),
        fixes: vec![Fix::new(
            "the repository is left as-is for inspection; delete it to start over",
        )],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zigup_ui::ScriptedPrompter;

    fn seeded_repo(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "test").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();

            std::fs::write(dir.join("build.zig"), b"// build").unwrap();
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("build.zig")).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = repo.signature().unwrap();
            let commit = repo
                .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
                .unwrap();
            repo.tag_lightweight("0.13.0", &repo.find_object(commit, None).unwrap(), false)
                .unwrap();
        }
        repo
    }

    #[test]
    fn test_resolve_commit_by_tag() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded_repo(dir.path());
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

        let oid = resolve_commit(&repo, "0.13.0", false, &mut prompter).unwrap();
        assert!(repo.find_commit(oid).is_ok());
        // The tag matched, so nothing was asked.
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn test_resolve_commit_interactive_sha() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded_repo(dir.path());
        let head = repo.head().unwrap().peel_to_commit().unwrap().id();

        let mut prompter = ScriptedPrompter::new(["bogus", head.to_string().as_str()]);
        let oid = resolve_commit(&repo, "9.9.9", false, &mut prompter).unwrap();
        assert_eq!(oid, head);
        // One rejected answer, one accepted.
        assert_eq!(prompter.asked.len(), 2);
    }

    #[test]
    fn test_checkout_detached() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded_repo(dir.path());
        let head = repo.head().unwrap().peel_to_commit().unwrap().id();

        checkout_detached(&repo, head).unwrap();
        assert!(repo.head_detached().unwrap());
    }

    #[test]
    fn test_open_or_clone_opens_existing_without_fetch() {
        let dir = tempfile::tempdir().unwrap();
        seeded_repo(dir.path());

        // Declines the fetch, so no network is touched.
        let mut prompter = ScriptedPrompter::new(["n"]);
        let repo = open_or_clone(dir.path(), &mut prompter).unwrap();
        assert!(repo.path().exists());
        assert_eq!(prompter.asked.len(), 1);
    }
}
