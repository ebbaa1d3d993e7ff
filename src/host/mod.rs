//! Code host adapters
//!
//! Concrete implementations of the [`CodeHost`](crate::ports::CodeHost) port.

mod detection;
mod github;

pub use detection::parse_repo_info;
pub use github::GitHubHost;

/// Repository coordinates on the code host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
