//! Sync workflow
//!
//! Reconciles the proposal after a user edits the PR description. No-ops
//! when the selection matches the declared version so that every edit
//! webhook does not churn the branch.

use crate::config::PlsConfig;
use crate::error::Result;
use crate::orchestrate::{
    BaseState, assess_base, build_release_files, declared_version, options_for, proposal_body,
    proposal_title, release_message,
};
use crate::ports::{CodeHost, LocalRepository};
use crate::selection::parse_options_block;
use crate::types::ReleaseMetadata;
use crate::version::Version;
use tracing::info;

/// Result of the sync workflow
#[derive(Debug)]
pub enum SyncOutcome {
    /// No open proposal (or no parseable options block) to sync
    NoProposal,
    /// The selection already matches the declared version; nothing done
    UpToDate {
        /// The declared version
        version: Version,
    },
    /// The proposal was rebuilt for the newly selected version
    Synced {
        /// The proposal PR number
        pr_number: u64,
        /// The newly declared version
        version: Version,
    },
}

/// Run the sync workflow
pub async fn sync(
    repo: &dyn LocalRepository,
    host: &dyn CodeHost,
    config: &PlsConfig,
) -> Result<SyncOutcome> {
    let Some(pr) = host
        .find_open_pr(&config.release_branch, &config.base_branch)
        .await?
    else {
        return Ok(SyncOutcome::NoProposal);
    };

    let Some(selection) = parse_options_block(&pr.body) else {
        return Ok(SyncOutcome::NoProposal);
    };
    let Some(selected) = selection.effective().cloned() else {
        return Ok(SyncOutcome::NoProposal);
    };

    // The title declares the version the proposal currently embodies; when
    // the selection matches it there is nothing to rebuild
    if declared_version(&pr.title).is_some_and(|declared| declared == selected.version) {
        return Ok(SyncOutcome::UpToDate {
            version: selected.version,
        });
    }

    let pending = match assess_base(repo, host, config).await? {
        BaseState::Pending(pending) => pending,
        // The base moved under us (manifest gone or already released);
        // propose will rebuild from scratch on its next run
        BaseState::NoManifest { .. } | BaseState::NoChanges => {
            return Ok(SyncOutcome::NoProposal);
        }
    };

    let version = selected.version.clone();
    let metadata = ReleaseMetadata {
        version: version.clone(),
        from: pending.current.clone(),
        kind: selected.kind,
    };
    let (files, entry) = build_release_files(host, config, &pending, &version).await?;
    let options = options_for(&pending.bump, &version);

    // Ordering is load-bearing: create the commit first, then move the
    // branch pointer directly old -> new. Resetting through the base branch
    // would make the proposal momentarily identical to base, and the host
    // auto-closes PRs with zero new commits.
    let commit = host
        .commit_files(&files, &release_message(&metadata), &pending.base_head)
        .await?;
    host.point_branch(&config.release_branch, &commit, true)
        .await?;

    host.update_pr(
        pr.number,
        &proposal_title(&version),
        &proposal_body(&version, &entry, &options),
    )
    .await?;

    info!(pr = pr.number, %version, "synced proposal to selected version");
    Ok(SyncOutcome::Synced {
        pr_number: pr.number,
        version,
    })
}
