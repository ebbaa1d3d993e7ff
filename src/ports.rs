//! Ports consumed by the release orchestrator
//!
//! Two narrow interfaces: a local repository (filesystem + git CLI) and a
//! code host (hosted API). The orchestrator is ignorant of which concrete
//! adapter it holds; tests inject mocks.

use crate::error::Result;
use crate::types::{Commit, PullRequest, ReleaseTag};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Ordered file map for an atomic multi-file commit (path → content)
pub type FileSet = BTreeMap<String, String>;

/// Local repository port: working-copy files plus git history
#[async_trait]
pub trait LocalRepository: Send + Sync {
    /// Read a file from the working copy
    async fn read_file(&self, path: &str) -> Result<String>;

    /// Write a file in the working copy
    async fn write_file(&self, path: &str, content: &str) -> Result<()>;

    /// Whether a file exists in the working copy
    async fn file_exists(&self, path: &str) -> Result<bool>;

    /// Stage everything and commit; returns the new revision
    async fn commit(&self, message: &str) -> Result<String>;

    /// Create an annotated tag at HEAD
    async fn create_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Revision a tag points at, if the tag exists
    async fn tag_revision(&self, name: &str) -> Result<Option<String>>;

    /// Annotated message of a tag, if the tag exists and is annotated
    async fn tag_message(&self, name: &str) -> Result<Option<String>>;

    /// Classified commits after `revision` up to HEAD (entire history when
    /// `None`), newest first
    async fn commits_since(&self, revision: Option<&str>) -> Result<Vec<Commit>>;

    /// Current HEAD revision
    async fn head_revision(&self) -> Result<String>;

    /// Full commit message of a revision
    async fn commit_message(&self, revision: &str) -> Result<String>;

    /// Last commit whose diff for `path` contains `needle`, if any
    async fn find_commit_by_content(&self, needle: &str, path: &str) -> Result<Option<String>>;

    /// Push a refspec to the default remote
    async fn push(&self, refspec: &str) -> Result<()>;

    /// Fetch from a remote
    async fn fetch(&self, remote: &str) -> Result<()>;

    /// Check out a branch
    async fn checkout_branch(&self, branch: &str) -> Result<()>;

    /// Rebase the current branch onto `onto`. Returns `false` when the
    /// rebase hit conflicts (the rebase is aborted before returning)
    async fn rebase(&self, onto: &str) -> Result<bool>;

    /// Conditionally force-push the current branch. Returns `false` when the
    /// lease was stale (someone else pushed in the meantime)
    async fn push_force_with_lease(&self, remote: &str, branch: &str) -> Result<bool>;
}

/// Code host port: the minimal hosted primitives the orchestrator consumes
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Read a file at a ref; `None` when the file does not exist
    async fn read_file(&self, path: &str, reference: &str) -> Result<Option<String>>;

    /// Whether a file exists at a ref
    async fn file_exists(&self, path: &str, reference: &str) -> Result<bool> {
        Ok(self.read_file(path, reference).await?.is_some())
    }

    /// Create one commit containing all `files`, on top of `parent`, via the
    /// host's blob → tree → commit primitives. Returns the new revision.
    /// Does not move any branch pointer.
    async fn commit_files(&self, files: &FileSet, message: &str, parent: &str) -> Result<String>;

    /// Revision a branch points at, if the branch exists
    async fn branch_revision(&self, branch: &str) -> Result<Option<String>>;

    /// Move an existing branch pointer directly to `revision`
    async fn point_branch(&self, branch: &str, revision: &str, force: bool) -> Result<()>;

    /// Create a branch at `revision`
    async fn create_branch(&self, branch: &str, revision: &str) -> Result<()>;

    /// Create the branch, or force-move it if it already exists
    async fn ensure_branch(&self, branch: &str, revision: &str) -> Result<()>;

    /// Create an annotated tag at `revision`
    async fn create_tag(&self, name: &str, message: &str, revision: &str) -> Result<()>;

    /// Look up a tag by name
    async fn get_tag(&self, name: &str) -> Result<Option<ReleaseTag>>;

    /// Find the open PR from `head` into `base`, if one exists
    async fn find_open_pr(&self, head: &str, base: &str) -> Result<Option<PullRequest>>;

    /// Find the most recently merged PR whose head was `head`, if any
    async fn find_merged_pr(&self, head: &str) -> Result<Option<PullRequest>>;

    /// Get a PR by number
    async fn get_pr(&self, number: u64) -> Result<Option<PullRequest>>;

    /// Create a PR
    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest>;

    /// Update a PR's title and body
    async fn update_pr(&self, number: u64, title: &str, body: &str) -> Result<()>;

    /// Create a release object for a tag
    async fn create_release(&self, tag: &str, name: &str, body: &str) -> Result<()>;

    /// Whether a release object exists for a tag
    async fn release_exists(&self, tag: &str) -> Result<bool>;
}
