//! Branch synchronization for the two-branch strategy
//!
//! After a release lands on the target branch, the integration branch is
//! rebased onto it and force-pushed with a lease. The upstream may move
//! between the fetch and the push, so the loop retries with backoff; the
//! lease guarantees we never silently discard someone else's concurrent
//! commit. Rebase conflicts abort immediately - they need a human.

use crate::config::PlsConfig;
use crate::error::Result;
use crate::ports::LocalRepository;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// Retries after the initial push attempt
const MAX_RETRIES: u32 = 3;
/// Base backoff; doubles per retry (2s, 4s, 8s)
const BACKOFF_BASE: Duration = Duration::from_secs(2);

/// Injectable sleep, so the retry loop is unit-testable with a fake clock
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Sleep for the given duration
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by tokio
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Result of a branch synchronization run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchSyncOutcome {
    /// The integration branch was rebased and pushed
    Synced {
        /// Number of attempts taken
        attempts: u32,
    },
    /// The rebase hit conflicts; reported, not thrown - manual action needed
    Conflicts,
    /// Every push attempt lost the lease race
    RetriesExhausted,
}

/// Rebase the integration branch onto the target branch and force-push it,
/// retrying with backoff when the lease fails
pub async fn sync_branches(
    repo: &dyn LocalRepository,
    sleeper: &dyn Sleeper,
    config: &PlsConfig,
) -> Result<BranchSyncOutcome> {
    for attempt in 1..=MAX_RETRIES + 1 {
        if attempt > 1 {
            let backoff = BACKOFF_BASE * 2u32.pow(attempt - 2);
            warn!(attempt, ?backoff, "push lost the lease race; backing off");
            sleeper.sleep(backoff).await;
        }

        repo.fetch("origin").await?;
        repo.checkout_branch(&config.base_branch).await?;

        if !repo.rebase(&config.target_branch).await? {
            // Conflicts are surfaced as an outcome, not an error: the
            // workflow run itself succeeded at discovering them
            warn!(
                branch = %config.base_branch,
                onto = %config.target_branch,
                "rebase conflicts; manual sync needed"
            );
            return Ok(BranchSyncOutcome::Conflicts);
        }

        if repo
            .push_force_with_lease("origin", &config.base_branch)
            .await?
        {
            info!(branch = %config.base_branch, attempt, "integration branch synced");
            return Ok(BranchSyncOutcome::Synced { attempts: attempt });
        }
    }

    Ok(BranchSyncOutcome::RetriesExhausted)
}
