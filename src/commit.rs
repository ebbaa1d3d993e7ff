//! Conventional commit classification
//!
//! Parses raw commit messages into structured [`Commit`] records and filters
//! out commits that must not count toward a release (merges and this tool's
//! own release commits).

use crate::types::{Commit, CommitType};
use regex::Regex;
use std::sync::OnceLock;

fn subject_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<type>[a-z]+)(?:\((?P<scope>[^)]*)\))?(?P<bang>!)?:\s*(?P<desc>.+)$")
            .unwrap()
    })
}

/// Literal marker that flags a breaking change in a commit body
const BREAKING_MARKER: &str = "BREAKING CHANGE";

/// Classify one raw commit message.
///
/// Subjects matching `type(scope)?!?: description` are split into their
/// parts; anything else becomes `chore` with the whole first line as the
/// description. Returns `None` only for an empty message.
pub fn classify(revision: &str, message: &str, is_merge: bool) -> Option<Commit> {
    let message = message.trim_end();
    if message.trim().is_empty() {
        return None;
    }

    let (subject, body) = match message.split_once('\n') {
        Some((subject, rest)) => {
            let body = rest.trim();
            (
                subject.trim(),
                if body.is_empty() {
                    None
                } else {
                    Some(body.to_string())
                },
            )
        }
        None => (message.trim(), None),
    };

    let body_breaking = body.as_deref().is_some_and(|b| b.contains(BREAKING_MARKER));

    let commit = match subject_pattern().captures(subject) {
        Some(caps) => Commit {
            revision: revision.to_string(),
            commit_type: CommitType::from_token(&caps["type"]),
            scope: caps.name("scope").map(|m| m.as_str().to_string()),
            description: caps["desc"].trim().to_string(),
            breaking: caps.name("bang").is_some() || body_breaking,
            body,
            is_merge,
        },
        None => Commit {
            revision: revision.to_string(),
            commit_type: CommitType::Chore,
            scope: None,
            description: subject.to_string(),
            breaking: body_breaking,
            body,
            is_merge,
        },
    };

    Some(commit)
}

/// Drop commits that must not count toward a release: merge commits
/// (structural flag first, message-prefix heuristic second) and release
/// commits created by pls itself, so a release never re-counts its own
/// history.
pub fn filter_releasable(commits: Vec<Commit>) -> Vec<Commit> {
    commits
        .into_iter()
        .filter(|c| !c.is_merge)
        .filter(|c| !c.description.starts_with("Merge "))
        .filter(|c| !is_release_commit(c))
        .collect()
}

fn is_release_commit(commit: &Commit) -> bool {
    commit.commit_type == CommitType::Chore && commit.scope.as_deref() == Some("release")
}
