//! Host authentication
//!
//! Token lookup is the outermost ambient-state concern: the core only ever
//! sees the resolved token.

use crate::error::{Error, Result};
use std::env;
use tokio::process::Command;

/// Where a token was obtained from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Obtained from the `gh` CLI
    Cli,
    /// Obtained from an environment variable
    EnvVar,
}

/// Resolved host authentication
#[derive(Debug, Clone)]
pub struct HostAuth {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
}

/// Resolve GitHub authentication
///
/// Priority:
/// 1. gh CLI (`gh auth token`)
/// 2. `GITHUB_TOKEN` environment variable
/// 3. `GH_TOKEN` environment variable
pub async fn resolve_auth() -> Result<HostAuth> {
    if let Some(token) = gh_cli_token().await {
        return Ok(HostAuth {
            token,
            source: AuthSource::Cli,
        });
    }

    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = env::var(var) {
            if !token.is_empty() {
                return Ok(HostAuth {
                    token,
                    source: AuthSource::EnvVar,
                });
            }
        }
    }

    Err(Error::Auth(
        "no GitHub authentication found; run `gh auth login` or set GITHUB_TOKEN".to_string(),
    ))
}

async fn gh_cli_token() -> Option<String> {
    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}
