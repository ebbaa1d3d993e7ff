//! Repository detection from remote URLs

use crate::error::{Error, Result};
use crate::host::HostConfig;
use regex::Regex;

/// Parse repository coordinates (owner/repo, optional custom host) from a
/// remote URL
pub fn parse_repo_info(remote_url: &str) -> Result<HostConfig> {
    // SSH format: git@host:owner/repo.git
    // HTTPS format: https://host/owner/repo.git
    let re_ssh = Regex::new(r"git@[^:]+:(.+?)(?:\.git)?$").unwrap();
    let re_https = Regex::new(r"https?://[^/]+/(.+?)(?:\.git)?$").unwrap();

    let path = re_ssh
        .captures(remote_url)
        .or_else(|| re_https.captures(remote_url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::Parse(format!("cannot parse remote URL: {remote_url}")))?;

    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() < 2 {
        return Err(Error::Parse(format!("invalid repo path: {path}")));
    }

    let repo = (*parts.last().unwrap()).to_string();
    let owner = parts[..parts.len() - 1].join("/");

    let hostname = extract_hostname(remote_url);
    let host = hostname.filter(|h| h != "github.com");

    Ok(HostConfig { owner, repo, host })
}

fn extract_hostname(remote_url: &str) -> Option<String> {
    // SSH format
    if remote_url.starts_with("git@") {
        return remote_url
            .strip_prefix("git@")
            .and_then(|s| s.split(':').next())
            .map(ToString::to_string);
    }

    // HTTPS format
    url::Url::parse(remote_url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
}
