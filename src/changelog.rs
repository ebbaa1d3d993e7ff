//! Changelog rendering
//!
//! Groups classified commits into sections and renders release notes, the
//! changelog entry for a release, and the body of the release proposal PR.

use crate::types::{Commit, CommitType, VersionBump};
use chrono::NaiveDate;
use std::fmt::Write;

/// Changelog sections in render order
const SECTIONS: [(&str, SectionFilter); 6] = [
    ("Breaking Changes", SectionFilter::Breaking),
    ("Features", SectionFilter::Type(CommitType::Feat)),
    ("Bug Fixes", SectionFilter::Type(CommitType::Fix)),
    ("Performance", SectionFilter::Type(CommitType::Perf)),
    ("Documentation", SectionFilter::Type(CommitType::Docs)),
    ("Other", SectionFilter::Rest),
];

enum SectionFilter {
    Breaking,
    Type(CommitType),
    Rest,
}

/// Render the release notes for a bump (the body of the release object)
pub fn render_release_notes(bump: &VersionBump) -> String {
    let mut out = String::new();
    render_sections(&mut out, &bump.commits);
    out.trim_end().to_string()
}

/// Render a dated changelog entry for a bump
pub fn render_entry(bump: &VersionBump, date: NaiveDate) -> String {
    let mut out = format!("## {} ({})\n\n", bump.to, date.format("%Y-%m-%d"));
    render_sections(&mut out, &bump.commits);
    out.trim_end().to_string()
}

/// Prepend a new entry to an existing changelog, keeping the top-level
/// header in place when present
pub fn prepend_entry(existing: &str, entry: &str) -> String {
    let existing = existing.trim_start_matches('\u{feff}');
    if let Some(rest) = existing.strip_prefix("# ") {
        // Keep the "# Changelog" header line at the top
        let (header, tail) = match rest.split_once('\n') {
            Some((header, tail)) => (header, tail),
            None => (rest, ""),
        };
        let tail = tail.trim_start_matches('\n');
        let mut out = format!("# {header}\n\n{entry}\n");
        if !tail.is_empty() {
            let _ = write!(out, "\n{tail}");
        }
        out
    } else if existing.trim().is_empty() {
        format!("# Changelog\n\n{entry}\n")
    } else {
        format!("{entry}\n\n{existing}")
    }
}

/// Extract the entry for one version from a changelog, if present.
///
/// Used by finalize to recover the release notes after the proposal PR has
/// been merged.
pub fn extract_entry<'a>(changelog: &'a str, version: &str) -> Option<&'a str> {
    let heading = format!("## {version} ");
    let start = changelog.find(&heading)?;
    let after_heading = start + heading.len();
    let end = changelog[after_heading..]
        .find("\n## ")
        .map_or(changelog.len(), |i| after_heading + i);
    Some(changelog[start..end].trim_end())
}

fn render_sections(out: &mut String, commits: &[Commit]) {
    let mut rendered: Vec<&Commit> = Vec::new();

    for (title, filter) in &SECTIONS {
        let members: Vec<&Commit> = commits
            .iter()
            .filter(|c| match filter {
                SectionFilter::Breaking => c.breaking,
                SectionFilter::Type(t) => !c.breaking && c.commit_type == *t,
                SectionFilter::Rest => !c.breaking && !rendered.contains(c),
            })
            .collect();

        if members.is_empty() {
            continue;
        }

        let _ = writeln!(out, "### {title}\n");
        for commit in &members {
            let short = &commit.revision[..commit.revision.len().min(7)];
            match &commit.scope {
                Some(scope) => {
                    let _ = writeln!(out, "- **{scope}:** {} ({short})", commit.description);
                }
                None => {
                    let _ = writeln!(out, "- {} ({short})", commit.description);
                }
            }
            rendered.push(commit);
        }
        let _ = writeln!(out);
    }
}
