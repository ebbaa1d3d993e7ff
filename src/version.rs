//! Semantic version state machine
//!
//! Parsing, formatting, total ordering, bump-kind calculation and the
//! prerelease progression (alpha → beta → rc → stable).

use crate::error::{Error, Result};
use crate::types::{Commit, CommitType, VersionBump};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Prerelease stage, ordered alpha < beta < rc
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Alpha prerelease
    Alpha,
    /// Beta prerelease
    Beta,
    /// Release candidate
    Rc,
}

impl Stage {
    /// All stages in progression order
    pub const ALL: [Self; 3] = [Self::Alpha, Self::Beta, Self::Rc];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alpha => write!(f, "alpha"),
            Self::Beta => write!(f, "beta"),
            Self::Rc => write!(f, "rc"),
        }
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "alpha" => Ok(Self::Alpha),
            "beta" => Ok(Self::Beta),
            "rc" => Ok(Self::Rc),
            other => Err(Error::InvalidVersion {
                input: other.to_string(),
            }),
        }
    }
}

/// Target of a stage transition: a prerelease stage or stable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StageTarget {
    /// Move to an alpha prerelease
    Alpha,
    /// Move to a beta prerelease
    Beta,
    /// Move to a release candidate
    Rc,
    /// Strip the prerelease suffix
    Stable,
}

impl StageTarget {
    /// All targets in progression order
    pub const ALL: [Self; 4] = [Self::Alpha, Self::Beta, Self::Rc, Self::Stable];

    /// The stage this target corresponds to, if not stable
    pub const fn stage(self) -> Option<Stage> {
        match self {
            Self::Alpha => Some(Stage::Alpha),
            Self::Beta => Some(Stage::Beta),
            Self::Rc => Some(Stage::Rc),
            Self::Stable => None,
        }
    }
}

impl From<Stage> for StageTarget {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Alpha => Self::Alpha,
            Stage::Beta => Self::Beta,
            Stage::Rc => Self::Rc,
        }
    }
}

impl fmt::Display for StageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => write!(f, "stable"),
            other => write!(f, "{}", other.stage().unwrap()),
        }
    }
}

/// Prerelease suffix: a stage with a build counter (`alpha.3`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Prerelease {
    /// Prerelease stage
    pub stage: Stage,
    /// Build number within the stage
    pub build: u32,
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.stage, self.build)
    }
}

/// A parsed semantic version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    /// Major component
    pub major: u64,
    /// Minor component
    pub minor: u64,
    /// Patch component
    pub patch: u64,
    /// Optional prerelease suffix
    pub prerelease: Option<Prerelease>,
}

impl Version {
    /// Construct a stable version
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Parse a version string; returns `None` for anything that is not
    /// `major.minor.patch` with an optional `-stage.build` suffix
    pub fn parse(input: &str) -> Option<Self> {
        let (core, pre) = match input.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (input, None),
        };

        let mut parts = core.split('.');
        let major = parse_component(parts.next()?)?;
        let minor = parse_component(parts.next()?)?;
        let patch = parse_component(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }

        let prerelease = match pre {
            None => None,
            Some(pre) => {
                let (stage, build) = pre.split_once('.')?;
                let stage = stage.parse::<Stage>().ok()?;
                let build = u32::try_from(parse_component(build)?).ok()?;
                Some(Prerelease { stage, build })
            }
        };

        Some(Self {
            major,
            minor,
            patch,
            prerelease,
        })
    }

    /// Whether this version carries a prerelease suffix
    pub const fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// The stable part of this version (prerelease suffix stripped)
    pub const fn stable_base(&self) -> Self {
        Self::new(self.major, self.minor, self.patch)
    }
}

fn parse_component(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Semver forbids leading zeros in numeric identifiers
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::InvalidVersion {
            input: s.to_string(),
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                // Stable sorts above any prerelease at the same triple
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Kind of version bump derived from a commit set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    /// Breaking change
    Major,
    /// New feature
    Minor,
    /// Fixes and everything else
    Patch,
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

impl FromStr for BumpKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            other => Err(Error::Parse(format!("unknown bump kind: {other}"))),
        }
    }
}

/// Kind recorded in release metadata: a bump or a stage transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseKind {
    /// Major bump
    Major,
    /// Minor bump
    Minor,
    /// Patch bump
    Patch,
    /// Prerelease stage transition (numeric base unchanged)
    Transition,
}

impl From<BumpKind> for ReleaseKind {
    fn from(kind: BumpKind) -> Self {
        match kind {
            BumpKind::Major => Self::Major,
            BumpKind::Minor => Self::Minor,
            BumpKind::Patch => Self::Patch,
        }
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
            Self::Transition => write!(f, "transition"),
        }
    }
}

impl FromStr for ReleaseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "transition" => Ok(Self::Transition),
            other => Err(Error::Parse(format!("unknown release kind: {other}"))),
        }
    }
}

/// Determine the bump kind for a set of releasable commits.
///
/// Breaking changes yield a major bump, except pre-1.0 where semver
/// convention demotes breaking changes to minor. Features yield minor,
/// anything else patch. An empty set means no release.
pub fn determine_bump_kind(commits: &[Commit], current: &Version) -> Option<BumpKind> {
    if commits.is_empty() {
        return None;
    }
    if commits.iter().any(|c| c.breaking) {
        // Pre-1.0: breaking changes are minor, not major
        if current.major == 0 {
            return Some(BumpKind::Minor);
        }
        return Some(BumpKind::Major);
    }
    if commits.iter().any(|c| c.commit_type == CommitType::Feat) {
        return Some(BumpKind::Minor);
    }
    Some(BumpKind::Patch)
}

/// Calculate the next version from the current one and a commit set.
///
/// While in prerelease only the build counter advances; the commit-derived
/// kind is still recorded on the bump for display.
pub fn calculate_bump(current: &Version, commits: &[Commit]) -> Option<VersionBump> {
    let kind = determine_bump_kind(commits, current)?;

    let to = match &current.prerelease {
        Some(pre) => with_prerelease(current, pre.stage, pre.build + 1),
        None => apply_kind(current, kind),
    };

    Some(VersionBump {
        from: current.clone(),
        to,
        kind,
        commits: commits.to_vec(),
    })
}

fn with_prerelease(version: &Version, stage: Stage, build: u32) -> Version {
    Version {
        prerelease: Some(Prerelease { stage, build }),
        ..version.stable_base()
    }
}

fn apply_kind(version: &Version, kind: BumpKind) -> Version {
    match kind {
        BumpKind::Major => Version::new(version.major + 1, 0, 0),
        BumpKind::Minor => Version::new(version.major, version.minor + 1, 0),
        BumpKind::Patch => Version::new(version.major, version.minor, version.patch + 1),
    }
}

/// Enter a prerelease: bump the stable numeric part by `kind`, then append
/// `stage.0`
pub fn to_prerelease(version: &Version, kind: BumpKind, stage: Stage) -> Version {
    let base = apply_kind(&version.stable_base(), kind);
    Version {
        prerelease: Some(Prerelease { stage, build: 0 }),
        ..base
    }
}

/// Move between prerelease stages (or to stable) without changing the
/// numeric base
pub fn transition(version: &Version, target: StageTarget) -> Version {
    match target.stage() {
        Some(stage) => Version {
            prerelease: Some(Prerelease { stage, build: 0 }),
            ..version.stable_base()
        },
        None => version.stable_base(),
    }
}
