//! Version selection protocol
//!
//! Generates and parses the machine-readable "version options" block embedded
//! in the release PR description. Each option line carries human-readable text
//! plus a hidden trailer encoding `{version, kind, status}`, bounded by fixed
//! markers so the block can be located and replaced verbatim without
//! disturbing surrounding prose.

use crate::types::{VersionBump, VersionOption, VersionSelection};
use crate::version::{ReleaseKind, Stage, StageTarget, to_prerelease, transition};
use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;

/// Start marker of the options block
pub const OPTIONS_START: &str = "<!-- pls:options -->";
/// End marker of the options block
pub const OPTIONS_END: &str = "<!-- pls:options:end -->";

fn current_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\*\*Current: (\S+)\*\* \(([^)]*)\) <!-- pls:v:(?:\S+):([a-z]+):current -->$",
        )
        .unwrap()
    })
}

fn option_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^- \[([ xX])\] (?:~~)?(\S+?)(?:~~)? \(([^)]*)\) <!-- pls:v:(?:\S+?):([a-z]+)(?::disabled:([^>]*?))? -->$",
        )
        .unwrap()
    })
}

/// Build the option set for a bump.
///
/// Option 0 is always the commit-derived proposal and starts selected. A
/// stable current version additionally offers entering alpha/beta/rc at the
/// same target; a prerelease current version offers every later stage
/// (including stable) and disables earlier ones.
pub fn build_options(bump: &VersionBump) -> Vec<VersionOption> {
    let kind = ReleaseKind::from(bump.kind);
    let mut options = vec![VersionOption {
        version: bump.to.clone(),
        kind,
        label: bump.kind.to_string(),
        selected: true,
        disabled: false,
        disabled_reason: None,
    }];

    match &bump.from.prerelease {
        None => {
            for stage in Stage::ALL {
                options.push(VersionOption {
                    version: to_prerelease(&bump.from, bump.kind, stage),
                    kind,
                    label: format!("pre-release {stage}"),
                    selected: false,
                    disabled: false,
                    disabled_reason: None,
                });
            }
        }
        Some(pre) => {
            let current: StageTarget = pre.stage.into();
            for target in StageTarget::ALL {
                if target == current {
                    continue;
                }
                let earlier = target < current;
                let label = if earlier {
                    format!("back to {target}")
                } else if target == StageTarget::Stable {
                    "stable release".to_string()
                } else {
                    format!("promote to {target}")
                };
                options.push(VersionOption {
                    version: transition(&bump.from, target),
                    kind: ReleaseKind::Transition,
                    label,
                    selected: false,
                    disabled: earlier,
                    disabled_reason: earlier
                        .then(|| format!("cannot move backwards from {}", pre.stage)),
                });
            }
        }
    }

    options
}

/// Render the options block, markers included
pub fn render_options_block(options: &[VersionOption]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{OPTIONS_START}");

    for (i, option) in options.iter().enumerate() {
        if i == 0 {
            let _ = writeln!(
                out,
                "**Current: {v}** ({label}) <!-- pls:v:{v}:{kind}:current -->",
                v = option.version,
                label = option.label,
                kind = option.kind,
            );
        } else if option.disabled {
            let _ = writeln!(
                out,
                "- [ ] ~~{v}~~ ({label}) <!-- pls:v:{v}:{kind}:disabled:{reason} -->",
                v = option.version,
                label = option.label,
                kind = option.kind,
                reason = option.disabled_reason.as_deref().unwrap_or_default(),
            );
        } else {
            let _ = writeln!(
                out,
                "- [{mark}] {v} ({label}) <!-- pls:v:{v}:{kind} -->",
                mark = if option.selected { 'x' } else { ' ' },
                v = option.version,
                label = option.label,
                kind = option.kind,
            );
        }
    }

    let _ = write!(out, "{OPTIONS_END}");
    out
}

/// Parse the options block out of a PR description.
///
/// Only the lines between the markers are scanned. The current line is always
/// a candidate; any checked, non-disabled checkbox overrides it. When several
/// are checked the first one found wins (documented ambiguity, not an error).
/// Disabled options are never selectable even when checked.
pub fn parse_options_block(body: &str) -> Option<VersionSelection> {
    let start = body.find(OPTIONS_START)?;
    let end = body[start..].find(OPTIONS_END)? + start;
    let block = &body[start + OPTIONS_START.len()..end];

    let mut options = Vec::new();
    let mut current_idx = None;
    let mut checked_idx = None;

    for line in block.lines() {
        let line = line.trim();
        if let Some(caps) = current_line().captures(line) {
            current_idx = Some(options.len());
            options.push(VersionOption {
                version: caps[1].parse().ok()?,
                kind: caps[3].parse().ok()?,
                label: caps[2].to_string(),
                selected: false,
                disabled: false,
                disabled_reason: None,
            });
        } else if let Some(caps) = option_line().captures(line) {
            let checked = !caps[1].trim().is_empty();
            let disabled = caps.get(5).is_some();
            if checked && !disabled && checked_idx.is_none() {
                checked_idx = Some(options.len());
            }
            options.push(VersionOption {
                version: caps[2].parse().ok()?,
                kind: caps[4].parse().ok()?,
                label: caps[3].to_string(),
                selected: false,
                disabled,
                disabled_reason: caps.get(5).map(|m| m.as_str().to_string()),
            });
        }
    }

    if let Some(idx) = checked_idx.or(current_idx) {
        options[idx].selected = true;
    }

    let current = current_idx.map(|idx| options[idx].clone());
    let checked = checked_idx.map(|idx| options[idx].clone());
    Some(VersionSelection {
        options,
        current,
        checked,
    })
}

/// Remove the options block from a PR body (used for release notes)
pub fn strip_options_block(body: &str) -> String {
    if let Some(start) = body.find(OPTIONS_START) {
        if let Some(end) = body[start..].find(OPTIONS_END) {
            let end = start + end + OPTIONS_END.len();
            let stripped = format!("{}{}", body[..start].trim_end(), &body[end..]);
            return stripped.trim().to_string();
        }
    }
    body.trim().to_string()
}

/// Replace the options block inside a PR body, or append one when missing
pub fn replace_options_block(body: &str, block: &str) -> String {
    if let Some(start) = body.find(OPTIONS_START) {
        if let Some(end) = body[start..].find(OPTIONS_END) {
            let end = start + end + OPTIONS_END.len();
            return format!("{}{}{}", &body[..start], block, &body[end..]);
        }
    }
    if body.trim().is_empty() {
        block.to_string()
    } else {
        format!("{}\n\n{block}", body.trim_end())
    }
}
