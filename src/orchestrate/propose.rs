//! Propose workflow
//!
//! Opens or refreshes the release proposal PR. Idempotent: callable any
//! number of times; each run rebuilds the proposal commit against the
//! current base head and honors any user override found in the open PR.

use crate::config::PlsConfig;
use crate::error::Result;
use crate::manifest::{MANIFEST_PATH, Manifest, detect_ecosystem_version};
use crate::orchestrate::{
    BaseState, assess_base, build_release_files, options_for, proposal_body, proposal_title,
    release_message,
};
use crate::ports::{CodeHost, FileSet, LocalRepository};
use crate::selection::parse_options_block;
use crate::types::{PullRequest, ReleaseMetadata};
use crate::version::{ReleaseKind, Version};
use tracing::info;

/// Result of the propose workflow
#[derive(Debug)]
pub enum ProposeOutcome {
    /// No releasable commits since the last release; nothing proposed
    NoChanges,
    /// No version manifest existed; a bootstrap proposal was opened
    Bootstrap {
        /// The bootstrap PR
        pr: PullRequest,
    },
    /// A release proposal was opened or refreshed
    Proposed {
        /// The proposal PR
        pr: PullRequest,
        /// The proposed version
        version: Version,
        /// Whether the PR was newly created (false: updated in place)
        created: bool,
    },
}

/// Run the propose workflow
pub async fn propose(
    repo: &dyn LocalRepository,
    host: &dyn CodeHost,
    config: &PlsConfig,
) -> Result<ProposeOutcome> {
    let pending = match assess_base(repo, host, config).await? {
        BaseState::NoManifest { base_head } => {
            return bootstrap(host, config, &base_head).await;
        }
        BaseState::NoChanges => return Ok(ProposeOutcome::NoChanges),
        BaseState::Pending(pending) => pending,
    };

    let existing = host
        .find_open_pr(&config.release_branch, &config.base_branch)
        .await?;

    // An override recovered from the open PR wins over the computed target
    let (version, kind) = match existing.as_ref().and_then(|pr| user_override(pr, &pending.bump.to))
    {
        Some((version, kind)) => {
            info!(%version, "honoring user-selected version from open proposal");
            (version, kind)
        }
        None => (pending.bump.to.clone(), ReleaseKind::from(pending.bump.kind)),
    };

    let metadata = ReleaseMetadata {
        version: version.clone(),
        from: pending.current.clone(),
        kind,
    };
    let (files, entry) = build_release_files(host, config, &pending, &version).await?;
    let options = options_for(&pending.bump, &version);
    let title = proposal_title(&version);
    let body = proposal_body(&version, &entry, &options);

    let commit = host
        .commit_files(&files, &release_message(&metadata), &pending.base_head)
        .await?;

    match existing {
        Some(pr) => {
            // Commit exists before the pointer moves; never reset through base
            host.point_branch(&config.release_branch, &commit, true)
                .await?;
            host.update_pr(pr.number, &title, &body).await?;
            info!(pr = pr.number, %version, "refreshed release proposal");
            Ok(ProposeOutcome::Proposed {
                pr,
                version,
                created: false,
            })
        }
        None => {
            host.ensure_branch(&config.release_branch, &commit).await?;
            let pr = host
                .create_pr(&config.release_branch, &config.base_branch, &title, &body)
                .await?;
            info!(pr = pr.number, %version, "opened release proposal");
            Ok(ProposeOutcome::Proposed {
                pr,
                version,
                created: true,
            })
        }
    }
}

/// An explicitly checked option is a user override; the current line alone
/// is not (it may be stale after the base branch moved)
fn user_override(pr: &PullRequest, computed: &Version) -> Option<(Version, ReleaseKind)> {
    let selection = parse_options_block(&pr.body)?;
    let checked = selection.checked?;
    if checked.version == *computed {
        return None;
    }
    Some((checked.version, checked.kind))
}

/// One-time bootstrap: propose adding the version manifest, seeding the
/// version from an ecosystem manifest when one declares it.
async fn bootstrap(
    host: &dyn CodeHost,
    config: &PlsConfig,
    base_head: &str,
) -> Result<ProposeOutcome> {
    let mut version = Version::new(0, 1, 0);
    for path in ["Cargo.toml", "package.json"] {
        if let Some(content) = host.read_file(path, &config.base_branch).await? {
            if let Some(detected) = detect_ecosystem_version(path, &content) {
                info!(path, %detected, "seeding manifest from ecosystem manifest");
                version = detected;
                break;
            }
        }
    }

    let manifest = Manifest::with_root(&version, config.version_file.clone());
    let mut files = FileSet::new();
    files.insert(MANIFEST_PATH.to_string(), manifest.to_json()?);

    let title = "chore: set up pls release tracking".to_string();
    let body = format!(
        "pls is not tracking this repository yet. Merging this PR adds \
         `{MANIFEST_PATH}` with the current version **{version}**; release \
         proposals start with the next push to `{}`.\n",
        config.base_branch
    );

    let commit = host
        .commit_files(&files, "chore: add pls version manifest", base_head)
        .await?;

    let existing = host
        .find_open_pr(&config.release_branch, &config.base_branch)
        .await?;
    let pr = match existing {
        Some(pr) => {
            host.point_branch(&config.release_branch, &commit, true)
                .await?;
            host.update_pr(pr.number, &title, &body).await?;
            pr
        }
        None => {
            host.ensure_branch(&config.release_branch, &commit).await?;
            host.create_pr(&config.release_branch, &config.base_branch, &title, &body)
                .await?
        }
    };

    Ok(ProposeOutcome::Bootstrap { pr })
}
