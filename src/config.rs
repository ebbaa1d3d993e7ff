//! Configuration
//!
//! Read once per invocation from `pls.config.json` with convention defaults;
//! never mutated at runtime.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default configuration file name
pub const CONFIG_PATH: &str = "pls.config.json";

/// Release strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Releases land directly on the integration branch
    #[default]
    Simple,
    /// Releases land on a separate target branch; the integration branch is
    /// rebased onto it after each release
    TwoBranch,
}

impl std::str::FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "simple" => Ok(Self::Simple),
            "two-branch" => Ok(Self::TwoBranch),
            other => Err(Error::InvalidStrategy {
                value: other.to_string(),
            }),
        }
    }
}

/// Runtime configuration for all workflows
#[derive(Debug, Clone)]
pub struct PlsConfig {
    /// Branch proposals are computed against (integration branch)
    pub base_branch: String,
    /// Branch releases land on (same as base under the simple strategy)
    pub target_branch: String,
    /// Branch holding the open release proposal
    pub release_branch: String,
    /// Optional tracked version file rewritten on release
    pub version_file: Option<String>,
    /// Release strategy
    pub strategy: Strategy,
}

impl Default for PlsConfig {
    fn default() -> Self {
        Self {
            base_branch: "main".to_string(),
            target_branch: "main".to_string(),
            release_branch: "pls/release".to_string(),
            version_file: None,
            strategy: Strategy::Simple,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
    base_branch: Option<String>,
    target_branch: Option<String>,
    release_branch: Option<String>,
    version_file: Option<String>,
    strategy: Option<String>,
}

impl PlsConfig {
    /// Parse configuration JSON, applying convention defaults for anything
    /// not set
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json).map_err(|e| Error::Config {
            message: format!("invalid {CONFIG_PATH}: {e}"),
        })?;
        Self::from_raw(raw)
    }

    /// Load configuration from a directory, falling back to defaults when no
    /// config file exists
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_PATH);
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(&path)?;
        Self::parse(&json)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let defaults = Self::default();
        let strategy = match raw.strategy {
            Some(s) => s.parse()?,
            None => Strategy::Simple,
        };

        let base_branch = raw.base_branch.unwrap_or(defaults.base_branch);
        let target_branch = match strategy {
            // Simple strategy: releases land on the base branch
            Strategy::Simple => raw.target_branch.unwrap_or_else(|| base_branch.clone()),
            Strategy::TwoBranch => raw.target_branch.unwrap_or_else(|| "release".to_string()),
        };

        Ok(Self {
            base_branch,
            target_branch,
            release_branch: raw.release_branch.unwrap_or(defaults.release_branch),
            version_file: raw.version_file,
            strategy,
        })
    }
}
