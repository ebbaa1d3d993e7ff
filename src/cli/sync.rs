//! Sync command - reconcile the proposal with the user's selection

use crate::cli::connect;
use crate::cli::style::{Stylize, check};
use pls_release::error::Result;
use pls_release::orchestrate::{SyncOutcome, sync};
use std::path::Path;

/// Run the sync command
pub async fn run_sync(path: &Path) -> Result<()> {
    let (repo, host, config) = connect(path).await?;

    match sync(&repo, &host, &config).await? {
        SyncOutcome::NoProposal => {
            println!("{} no open release proposal to sync", "·".muted());
        }
        SyncOutcome::UpToDate { version } => {
            println!(
                "{} proposal already declares {}",
                check(),
                format!("v{version}").accent()
            );
        }
        SyncOutcome::Synced { pr_number, version } => {
            println!(
                "{} rebuilt proposal {} for {}",
                check(),
                format!("#{pr_number}").emphasis(),
                format!("v{version}").accent()
            );
        }
    }

    Ok(())
}
