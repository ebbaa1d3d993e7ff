//! CLI commands
//!
//! Command implementations for the `pls` binary.

mod branch_sync;
mod finalize;
mod propose;
mod style;
mod sync;

pub use branch_sync::run_branch_sync;
pub use finalize::run_finalize;
pub use propose::run_propose;
pub use sync::run_sync;

use pls_release::auth::resolve_auth;
use pls_release::config::PlsConfig;
use pls_release::error::Result;
use pls_release::host::{GitHubHost, parse_repo_info};
use pls_release::repo::GitRepository;
use std::path::Path;

/// Open the repository, resolve authentication, and connect to the host
async fn connect(path: &Path) -> Result<(GitRepository, GitHubHost, PlsConfig)> {
    let repo = GitRepository::open(path)?;
    let config = PlsConfig::load(repo.workdir())?;

    let remote_url = repo.remote_url("origin").await?;
    let host_config = parse_repo_info(&remote_url)?;
    let auth = resolve_auth().await?;
    let host = GitHubHost::new(&auth.token, host_config)?;

    Ok((repo, host, config))
}
