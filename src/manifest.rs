//! Version manifest and tracked version file
//!
//! The manifest is a JSON object keyed by path (`"."` for the root package);
//! each value is `{version, versionFile?}`. Legacy bare-string values are
//! accepted on read and normalized to object form on write.

use crate::error::{Error, Result};
use crate::version::Version;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Path of the version manifest in the repository
pub const MANIFEST_PATH: &str = ".pls-manifest.json";

/// Marker that flags the next line of a tracked version file for rewriting.
/// Matched loosely so it can sit inside any language's comment syntax.
pub const VERSION_FILE_MARKER: &str = "pls-version";

/// One manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Current version for this path
    pub version: String,
    /// Optional tracked version file, rewritten on release
    #[serde(rename = "versionFile", skip_serializing_if = "Option::is_none")]
    pub version_file: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    // Legacy format: bare version string
    Plain(String),
    Full(ManifestEntry),
}

/// The version manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Entries keyed by path, `"."` for the root
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Parse manifest JSON, normalizing legacy bare-string entries
    pub fn parse(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawEntry> = serde_json::from_str(json)
            .map_err(|e| Error::Parse(format!("invalid version manifest: {e}")))?;

        let entries = raw
            .into_iter()
            .map(|(path, entry)| {
                let entry = match entry {
                    RawEntry::Plain(version) => ManifestEntry {
                        version,
                        version_file: None,
                    },
                    RawEntry::Full(entry) => entry,
                };
                (path, entry)
            })
            .collect();

        Ok(Self { entries })
    }

    /// Serialize to pretty JSON, always in normalized object form
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| Error::Parse(format!("cannot serialize manifest: {e}")))?;
        json.push('\n');
        Ok(json)
    }

    /// Construct a manifest with a single root entry
    pub fn with_root(version: &Version, version_file: Option<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            ".".to_string(),
            ManifestEntry {
                version: version.to_string(),
                version_file,
            },
        );
        Self { entries }
    }

    /// The root entry, if present
    pub fn root(&self) -> Option<&ManifestEntry> {
        self.entries.get(".")
    }

    /// The parsed root version
    pub fn root_version(&self) -> Result<Version> {
        let entry = self.root().ok_or_else(|| Error::Config {
            message: format!("manifest {MANIFEST_PATH} has no root (\".\") entry"),
        })?;
        entry.version.parse()
    }

    /// Set the root version, preserving the tracked version file setting
    pub fn set_root_version(&mut self, version: &Version) {
        self.entries
            .entry(".".to_string())
            .and_modify(|e| e.version = version.to_string())
            .or_insert_with(|| ManifestEntry {
                version: version.to_string(),
                version_file: None,
            });
    }
}

fn semver_literal() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\d+\.\d+\.\d+(?:-(?:alpha|beta|rc)\.\d+)?").unwrap()
    })
}

/// Rewrite the version literal in a tracked version file.
///
/// The file must contain a line with the [`VERSION_FILE_MARKER`]; the semver
/// literal on the following line is replaced in place, preserving whatever
/// quoting or syntax surrounds it. Returns `None` when no marker/literal pair
/// is found.
pub fn update_version_file(content: &str, version: &Version) -> Option<String> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let marker_idx = lines
        .iter()
        .position(|line| line.contains(VERSION_FILE_MARKER))?;
    let target = lines.get(marker_idx + 1)?;

    let replaced = semver_literal().replace(target, version.to_string());
    if replaced == *target {
        return None;
    }

    let mut out = String::with_capacity(content.len());
    for (i, line) in lines.iter().enumerate() {
        if i == marker_idx + 1 {
            out.push_str(&replaced);
        } else {
            out.push_str(line);
        }
    }
    Some(out)
}

/// Detect a version from an ecosystem manifest on the base branch.
///
/// Used only for the one-time bootstrap proposal when no version manifest
/// exists yet. Understands the `version` field of Cargo.toml and
/// package.json.
pub fn detect_ecosystem_version(path: &str, content: &str) -> Option<Version> {
    if path.ends_with("package.json") {
        let value: serde_json::Value = serde_json::from_str(content).ok()?;
        return Version::parse(value.get("version")?.as_str()?);
    }
    if path.ends_with("Cargo.toml") {
        for line in content.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("version") {
                let rest = rest.trim_start();
                if let Some(value) = rest.strip_prefix('=') {
                    let value = value.trim().trim_matches('"');
                    return Version::parse(value);
                }
            }
        }
    }
    None
}
