//! Release orchestration
//!
//! The top-level state machine tying the classifier, calculator, changelog
//! and selection protocol together into three workflows:
//! 1. Propose - open or refresh the release proposal PR
//! 2. Sync - reconcile the proposal after a user edits the selection
//! 3. Finalize - cut the tag and release once the proposal lands
//!
//! All persistent state lives in git history and hosted objects; every
//! workflow is safe to re-run.

mod finalize;
mod propose;
mod sync;

pub use finalize::{FinalizeOutcome, finalize};
pub use propose::{ProposeOutcome, propose};
pub use sync::{SyncOutcome, sync};

use crate::changelog;
use crate::commit::filter_releasable;
use crate::config::PlsConfig;
use crate::error::Result;
use crate::manifest::{MANIFEST_PATH, Manifest, update_version_file};
use crate::metadata::render_metadata;
use crate::ports::{CodeHost, FileSet, LocalRepository};
use crate::selection::{build_options, render_options_block};
use crate::types::{ReleaseMetadata, VersionBump, VersionOption};
use crate::version::{Version, calculate_bump};
use tracing::{debug, info, warn};

/// Path of the changelog file
pub const CHANGELOG_PATH: &str = "CHANGELOG.md";

/// State of the base branch relative to the release cycle
pub(crate) enum BaseState {
    /// No version manifest yet; a bootstrap proposal is needed
    NoManifest {
        /// Head revision of the base branch
        base_head: String,
    },
    /// Manifest present but no releasable commits since the last release
    NoChanges,
    /// A release is pending
    Pending(Box<PendingRelease>),
}

/// Everything needed to build or rebuild a proposal
pub(crate) struct PendingRelease {
    /// Head revision of the base branch
    pub base_head: String,
    /// Parsed manifest from the base branch
    pub manifest: Manifest,
    /// Current released version
    pub current: Version,
    /// Commit-derived bump
    pub bump: VersionBump,
}

/// Read the base branch and compute what, if anything, there is to release.
///
/// The last release revision is found through the managed tag when it exists;
/// when tags are missing (e.g. after a history rewrite) we fall back to a
/// content search for the commit that wrote the current version into the
/// manifest.
pub(crate) async fn assess_base(
    repo: &dyn LocalRepository,
    host: &dyn CodeHost,
    config: &PlsConfig,
) -> Result<BaseState> {
    let base_head = host
        .branch_revision(&config.base_branch)
        .await?
        .ok_or_else(|| crate::error::Error::NotFound {
            what: "branch",
            name: config.base_branch.clone(),
        })?;

    let Some(manifest_text) = host.read_file(MANIFEST_PATH, &config.base_branch).await? else {
        info!(branch = %config.base_branch, "no version manifest on base branch");
        return Ok(BaseState::NoManifest { base_head });
    };

    let manifest = Manifest::parse(&manifest_text)?;
    let current = manifest.root_version()?;

    let last_release = last_release_revision(repo, host, &current).await?;
    debug!(?last_release, current = %current, "looking for commits since last release");

    let commits = filter_releasable(repo.commits_since(last_release.as_deref()).await?);
    let Some(bump) = calculate_bump(&current, &commits) else {
        return Ok(BaseState::NoChanges);
    };

    info!(from = %bump.from, to = %bump.to, kind = %bump.kind, commits = bump.commits.len(), "release pending");
    Ok(BaseState::Pending(Box::new(PendingRelease {
        base_head,
        manifest,
        current,
        bump,
    })))
}

async fn last_release_revision(
    repo: &dyn LocalRepository,
    host: &dyn CodeHost,
    current: &Version,
) -> Result<Option<String>> {
    if let Some(tag) = host.get_tag(&tag_name(current)).await? {
        if tag.is_managed_release() {
            return Ok(Some(tag.revision));
        }
    }
    repo.find_commit_by_content(&manifest_needle(current), MANIFEST_PATH)
        .await
}

/// Tag name for a version
pub fn tag_name(version: &Version) -> String {
    format!("v{version}")
}

/// Search needle for the manifest line that declares a version
pub(crate) fn manifest_needle(version: &Version) -> String {
    format!("\"version\": \"{version}\"")
}

/// Subject + metadata block for a release commit or tag
pub(crate) fn release_message(metadata: &ReleaseMetadata) -> String {
    format!(
        "chore(release): {}\n\n{}",
        metadata.version,
        render_metadata(metadata)
    )
}

/// Title of the release proposal PR
pub(crate) fn proposal_title(version: &Version) -> String {
    format!("chore(release): {version}")
}

/// Build the full file set for a release commit: manifest bump, changelog
/// prepend, optional tracked version file.
pub(crate) async fn build_release_files(
    host: &dyn CodeHost,
    config: &PlsConfig,
    pending: &PendingRelease,
    version: &Version,
) -> Result<(FileSet, String)> {
    let mut files = FileSet::new();

    let mut manifest = pending.manifest.clone();
    manifest.set_root_version(version);
    files.insert(MANIFEST_PATH.to_string(), manifest.to_json()?);

    let display_bump = VersionBump {
        from: pending.current.clone(),
        to: version.clone(),
        kind: pending.bump.kind,
        commits: pending.bump.commits.clone(),
    };
    let entry = changelog::render_entry(&display_bump, chrono::Utc::now().date_naive());
    let existing = host
        .read_file(CHANGELOG_PATH, &config.base_branch)
        .await?
        .unwrap_or_default();
    files.insert(
        CHANGELOG_PATH.to_string(),
        changelog::prepend_entry(&existing, &entry),
    );

    let version_file = pending
        .manifest
        .root()
        .and_then(|e| e.version_file.clone())
        .or_else(|| config.version_file.clone());
    if let Some(path) = version_file {
        match host.read_file(&path, &config.base_branch).await? {
            Some(content) => match update_version_file(&content, version) {
                Some(updated) => {
                    files.insert(path, updated);
                }
                None => warn!(path, "tracked version file has no marker; skipping"),
            },
            None => warn!(path, "tracked version file missing on base branch"),
        }
    }

    Ok((files, entry))
}

/// Render the proposal PR body: changelog preview plus the options block
pub(crate) fn proposal_body(
    version: &Version,
    entry: &str,
    options: &[VersionOption],
) -> String {
    format!(
        "This PR proposes releasing **{version}**. Merging it will tag and publish the release.\n\n\
         Pick a different version by checking one of the boxes below.\n\n\
         {}\n\n---\n\n{entry}\n",
        render_options_block(options)
    )
}

/// Options for a pending release, with `chosen` checked when it differs
/// from the commit-derived target.
///
/// The current line always shows the computed version; a differing choice is
/// persisted as its checked checkbox, so later propose runs keep honoring it.
pub(crate) fn options_for(bump: &VersionBump, chosen: &Version) -> Vec<VersionOption> {
    let mut options = build_options(bump);
    if options[0].version != *chosen {
        for option in &mut options {
            option.selected = !option.disabled && option.version == *chosen;
        }
    }
    options
}

/// Version a proposal PR title declares, if it is a release title
pub(crate) fn declared_version(title: &str) -> Option<Version> {
    Version::parse(title.strip_prefix("chore(release): ")?.trim())
}
