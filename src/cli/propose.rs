//! Propose command - open or refresh the release proposal PR

use crate::cli::connect;
use crate::cli::style::{Stylize, check};
use pls_release::error::Result;
use pls_release::orchestrate::{ProposeOutcome, propose};
use std::path::Path;

/// Run the propose command
pub async fn run_propose(path: &Path) -> Result<()> {
    let (repo, host, config) = connect(path).await?;

    match propose(&repo, &host, &config).await? {
        ProposeOutcome::NoChanges => {
            println!(
                "{} no releasable commits since the last release",
                "·".muted()
            );
        }
        ProposeOutcome::Bootstrap { pr } => {
            println!(
                "{} opened bootstrap proposal {} ({})",
                check(),
                format!("#{}", pr.number).emphasis(),
                pr.html_url.accent()
            );
        }
        ProposeOutcome::Proposed {
            pr,
            version,
            created,
        } => {
            let verb = if created { "opened" } else { "refreshed" };
            println!(
                "{} {verb} release proposal {} for {} ({})",
                check(),
                format!("#{}", pr.number).emphasis(),
                format!("v{version}").accent(),
                pr.html_url.muted()
            );
        }
    }

    Ok(())
}
