//! Finalize command - cut the tag and release for a merged proposal

use crate::cli::connect;
use crate::cli::style::{Stylize, check};
use pls_release::error::Result;
use pls_release::orchestrate::{FinalizeOutcome, finalize};
use std::path::Path;

/// Run the finalize command
pub async fn run_finalize(path: &Path) -> Result<()> {
    let (repo, host, config) = connect(path).await?;

    match finalize(&repo, &host, &config).await? {
        FinalizeOutcome::NothingToRelease => {
            println!("{} nothing to release", "·".muted());
        }
        FinalizeOutcome::AlreadyReleased {
            version,
            release_backfilled,
        } => {
            if release_backfilled {
                println!(
                    "{} {} already tagged; backfilled the missing release",
                    check(),
                    format!("v{version}").accent()
                );
            } else {
                println!(
                    "{} {} already released",
                    check(),
                    format!("v{version}").accent()
                );
            }
        }
        FinalizeOutcome::Released { version, tag } => {
            println!(
                "{} released {} (tag {})",
                check(),
                format!("v{version}").accent(),
                tag.emphasis()
            );
        }
    }

    Ok(())
}
