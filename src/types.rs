//! Core types for pls-release

use crate::version::{ReleaseKind, Version};
use serde::{Deserialize, Serialize};

/// Conventional commit type token
///
/// Modeled as a closed enum with an explicit `Other` variant so changelog
/// grouping and bump-kind logic stay exhaustive and typo-safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitType {
    /// New feature
    Feat,
    /// Bug fix
    Fix,
    /// Performance improvement
    Perf,
    /// Documentation change
    Docs,
    /// Maintenance work (also the fallback for unparseable subjects)
    Chore,
    /// Code restructuring without behavior change
    Refactor,
    /// Test changes
    Test,
    /// Build system changes
    Build,
    /// CI configuration changes
    Ci,
    /// Formatting-only changes
    Style,
    /// Revert of an earlier commit
    Revert,
    /// Any other lowercase token
    Other(String),
}

impl CommitType {
    /// Parse a lowercase type token
    pub fn from_token(token: &str) -> Self {
        match token {
            "feat" => Self::Feat,
            "fix" => Self::Fix,
            "perf" => Self::Perf,
            "docs" => Self::Docs,
            "chore" => Self::Chore,
            "refactor" => Self::Refactor,
            "test" => Self::Test,
            "build" => Self::Build,
            "ci" => Self::Ci,
            "style" => Self::Style,
            "revert" => Self::Revert,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A classified conventional commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Revision id (commit hash)
    pub revision: String,
    /// Conventional commit type
    pub commit_type: CommitType,
    /// Optional scope from `type(scope):`
    pub scope: Option<String>,
    /// Subject description
    pub description: String,
    /// Breaking change (`!` marker or BREAKING CHANGE in body)
    pub breaking: bool,
    /// Message body after the subject line
    pub body: Option<String>,
    /// Whether this is a merge commit
    pub is_merge: bool,
}

/// One proposed version transition, computed from a commit set
#[derive(Debug, Clone)]
pub struct VersionBump {
    /// Version the transition starts from
    pub from: Version,
    /// Proposed next version
    pub to: Version,
    /// Kind of bump derived from the commits
    pub kind: crate::version::BumpKind,
    /// The commits that motivated the bump
    pub commits: Vec<Commit>,
}

/// Authoritative record of why a release commit/tag exists.
///
/// Embedded verbatim in commit and tag messages so any later process can
/// recover intent without recomputing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMetadata {
    /// The released version
    pub version: Version,
    /// The version released from
    pub from: Version,
    /// Kind of transition
    pub kind: ReleaseKind,
}

/// One selectable version in the PR options block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionOption {
    /// The version this option selects
    pub version: Version,
    /// Kind recorded for this option
    pub kind: ReleaseKind,
    /// Human-readable label
    pub label: String,
    /// Whether this option is currently selected
    pub selected: bool,
    /// Whether this option cannot be selected
    pub disabled: bool,
    /// Why the option is disabled
    pub disabled_reason: Option<String>,
}

/// The selection state parsed back out of a PR description
#[derive(Debug, Clone)]
pub struct VersionSelection {
    /// All options found between the markers, in document order
    pub options: Vec<VersionOption>,
    /// The option declared on the current line, if present
    pub current: Option<VersionOption>,
    /// The first checked non-disabled checkbox, if any (the user's explicit
    /// choice)
    pub checked: Option<VersionOption>,
}

impl VersionSelection {
    /// The effective selection: the explicit choice when one exists, else
    /// the declared current option
    pub fn effective(&self) -> Option<&VersionOption> {
        self.checked.as_ref().or(self.current.as_ref())
    }
}

/// A tag as seen on the code host or local repository
#[derive(Debug, Clone)]
pub struct ReleaseTag {
    /// Tag name (e.g. `v1.2.0`)
    pub name: String,
    /// Revision the tag points at
    pub revision: String,
    /// Annotated tag message, if any
    pub message: Option<String>,
    /// Metadata recovered from the message, if this is a managed tag
    pub metadata: Option<ReleaseMetadata>,
}

impl ReleaseTag {
    /// Whether this tag was created by pls (carries the metadata block).
    /// Unmanaged tags must never be overwritten or misread as releases.
    pub const fn is_managed_release(&self) -> bool {
        self.metadata.is_some()
    }
}

/// A pull request on the code host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// Title
    pub title: String,
    /// Description body
    pub body: String,
    /// Whether the PR has been merged
    pub merged: bool,
}
