//! Branch-sync command - rebase the integration branch after a release

use crate::cli::style::{Stylize, check, cross};
use pls_release::branch_sync::{BranchSyncOutcome, TokioSleeper, sync_branches};
use pls_release::config::{PlsConfig, Strategy};
use pls_release::error::Result;
use pls_release::repo::GitRepository;
use std::path::Path;
use std::process::ExitCode;

/// Run the branch-sync command.
///
/// Works entirely through the local git remote, so no host authentication
/// is needed.
pub async fn run_branch_sync(path: &Path) -> Result<ExitCode> {
    let repo = GitRepository::open(path)?;
    let config = PlsConfig::load(repo.workdir())?;

    if config.strategy != Strategy::TwoBranch {
        println!(
            "{} branch sync only applies to the two-branch strategy",
            "·".muted()
        );
        return Ok(ExitCode::SUCCESS);
    }

    match sync_branches(&repo, &TokioSleeper, &config).await? {
        BranchSyncOutcome::Synced { attempts } => {
            println!(
                "{} rebased {} onto {} (attempt {attempts})",
                check(),
                config.base_branch.accent(),
                config.target_branch.accent()
            );
            Ok(ExitCode::SUCCESS)
        }
        BranchSyncOutcome::Conflicts => {
            eprintln!(
                "{} rebase of {} onto {} hit conflicts; resolve and push manually",
                cross(),
                config.base_branch.warn(),
                config.target_branch.warn()
            );
            Ok(ExitCode::FAILURE)
        }
        BranchSyncOutcome::RetriesExhausted => {
            eprintln!(
                "{} {} kept moving during sync; giving up after repeated lease failures",
                cross(),
                config.base_branch.warn()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
