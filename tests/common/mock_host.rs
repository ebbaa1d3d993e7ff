//! In-memory code host for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use pls_release::error::{Error, Result};
use pls_release::metadata::parse_metadata;
use pls_release::ports::{CodeHost, FileSet};
use pls_release::types::{PullRequest, ReleaseTag};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `commit_files`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFilesCall {
    pub message: String,
    pub parent: String,
    pub paths: Vec<String>,
}

/// Call record for `point_branch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointBranchCall {
    pub branch: String,
    pub revision: String,
    pub force: bool,
}

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
}

/// Call record for `update_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePrCall {
    pub number: u64,
    pub title: String,
    pub body: String,
}

/// Call record for `create_tag`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTagCall {
    pub name: String,
    pub revision: String,
}

/// Call record for `create_release`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReleaseCall {
    pub tag: String,
    pub name: String,
    pub body: String,
}

#[derive(Clone)]
struct MockCommit {
    parent: Option<String>,
    message: String,
    files: FileSet,
}

#[derive(Default)]
struct HostState {
    branches: HashMap<String, String>,
    commits: HashMap<String, MockCommit>,
    tags: HashMap<String, ReleaseTag>,
    prs: Vec<PullRequest>,
    releases: HashMap<String, (String, String)>,
}

/// In-memory mock of the code host.
///
/// Models branches, commits (with their file sets), tags, PRs and releases
/// as real state so idempotence tests exercise the same conflicts a live
/// host would report ("already exists" errors come from the state, not from
/// injection).
///
/// Features:
/// - Auto-incrementing PR numbers and commit revisions
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockHost {
    state: Mutex<HostState>,
    next_pr_number: AtomicU64,
    next_revision: AtomicU64,
    // Call tracking
    commit_files_calls: Mutex<Vec<CommitFilesCall>>,
    point_branch_calls: Mutex<Vec<PointBranchCall>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    update_pr_calls: Mutex<Vec<UpdatePrCall>>,
    create_tag_calls: Mutex<Vec<CreateTagCall>>,
    create_release_calls: Mutex<Vec<CreateReleaseCall>>,
    // Error injection
    error_on_commit_files: Mutex<Option<String>>,
    error_on_create_release: Mutex<Option<String>>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    /// Create an empty mock host
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HostState::default()),
            next_pr_number: AtomicU64::new(1),
            next_revision: AtomicU64::new(1),
            commit_files_calls: Mutex::new(Vec::new()),
            point_branch_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            update_pr_calls: Mutex::new(Vec::new()),
            create_tag_calls: Mutex::new(Vec::new()),
            create_release_calls: Mutex::new(Vec::new()),
            error_on_commit_files: Mutex::new(None),
            error_on_create_release: Mutex::new(None),
        }
    }

    // === Seeding ===

    /// Seed a branch pointing at a revision
    pub fn seed_branch(&self, branch: &str, revision: &str) {
        self.state
            .lock()
            .unwrap()
            .branches
            .insert(branch.to_string(), revision.to_string());
    }

    /// Seed a commit with the files it introduced
    pub fn seed_commit(
        &self,
        revision: &str,
        parent: Option<&str>,
        message: &str,
        files: &[(&str, &str)],
    ) {
        let files = files
            .iter()
            .map(|(p, c)| ((*p).to_string(), (*c).to_string()))
            .collect();
        self.state.lock().unwrap().commits.insert(
            revision.to_string(),
            MockCommit {
                parent: parent.map(ToString::to_string),
                message: message.to_string(),
                files,
            },
        );
    }

    /// Seed a tag; metadata is recovered from the message like a real host
    pub fn seed_tag(&self, name: &str, revision: &str, message: Option<&str>) {
        self.state.lock().unwrap().tags.insert(
            name.to_string(),
            ReleaseTag {
                name: name.to_string(),
                revision: revision.to_string(),
                message: message.map(ToString::to_string),
                metadata: message.and_then(parse_metadata),
            },
        );
    }

    /// Seed a PR (merged PRs are treated as closed)
    pub fn seed_pr(&self, pr: PullRequest) {
        let mut state = self.state.lock().unwrap();
        if pr.number >= self.next_pr_number.load(Ordering::SeqCst) {
            self.next_pr_number.store(pr.number + 1, Ordering::SeqCst);
        }
        state.prs.push(pr);
    }

    // === Error injection ===

    /// Make `commit_files` return a host error
    pub fn fail_commit_files(&self, msg: &str) {
        *self.error_on_commit_files.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_release` return a host error
    pub fn fail_create_release(&self, msg: &str) {
        *self.error_on_create_release.lock().unwrap() = Some(msg.to_string());
    }

    // === Verification ===

    /// All `commit_files` calls made
    pub fn commit_files_calls(&self) -> Vec<CommitFilesCall> {
        self.commit_files_calls.lock().unwrap().clone()
    }

    /// All `point_branch` calls made
    pub fn point_branch_calls(&self) -> Vec<PointBranchCall> {
        self.point_branch_calls.lock().unwrap().clone()
    }

    /// All `create_pr` calls made
    pub fn create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// All `update_pr` calls made
    pub fn update_pr_calls(&self) -> Vec<UpdatePrCall> {
        self.update_pr_calls.lock().unwrap().clone()
    }

    /// All `create_tag` calls made
    pub fn create_tag_calls(&self) -> Vec<CreateTagCall> {
        self.create_tag_calls.lock().unwrap().clone()
    }

    /// All `create_release` calls made
    pub fn create_release_calls(&self) -> Vec<CreateReleaseCall> {
        self.create_release_calls.lock().unwrap().clone()
    }

    /// Current revision of a branch
    pub fn branch(&self, branch: &str) -> Option<String> {
        self.state.lock().unwrap().branches.get(branch).cloned()
    }

    /// Content of a file committed at a revision, walking parents
    pub fn file_at(&self, revision: &str, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        let mut cursor = Some(revision.to_string());
        while let Some(rev) = cursor {
            let commit = state.commits.get(&rev)?;
            if let Some(content) = commit.files.get(path) {
                return Some(content.clone());
            }
            cursor = commit.parent.clone();
        }
        None
    }

    /// A PR by number
    pub fn pr(&self, number: u64) -> Option<PullRequest> {
        self.state
            .lock()
            .unwrap()
            .prs
            .iter()
            .find(|pr| pr.number == number)
            .cloned()
    }

    /// Message of a commit
    pub fn commit_message_of(&self, revision: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .commits
            .get(revision)
            .map(|c| c.message.clone())
    }
}

#[async_trait]
impl CodeHost for MockHost {
    async fn read_file(&self, path: &str, reference: &str) -> Result<Option<String>> {
        let revision = {
            let state = self.state.lock().unwrap();
            state
                .branches
                .get(reference)
                .cloned()
                .unwrap_or_else(|| reference.to_string())
        };
        Ok(self.file_at(&revision, path))
    }

    async fn commit_files(&self, files: &FileSet, message: &str, parent: &str) -> Result<String> {
        if let Some(msg) = self.error_on_commit_files.lock().unwrap().take() {
            return Err(Error::Host {
                message: msg,
                status: Some(500),
            });
        }
        self.commit_files_calls.lock().unwrap().push(CommitFilesCall {
            message: message.to_string(),
            parent: parent.to_string(),
            paths: files.keys().cloned().collect(),
        });
        let revision = format!("rev-{}", self.next_revision.fetch_add(1, Ordering::SeqCst));
        self.state.lock().unwrap().commits.insert(
            revision.clone(),
            MockCommit {
                parent: Some(parent.to_string()),
                message: message.to_string(),
                files: files.clone(),
            },
        );
        Ok(revision)
    }

    async fn branch_revision(&self, branch: &str) -> Result<Option<String>> {
        Ok(self.branch(branch))
    }

    async fn point_branch(&self, branch: &str, revision: &str, force: bool) -> Result<()> {
        self.point_branch_calls.lock().unwrap().push(PointBranchCall {
            branch: branch.to_string(),
            revision: revision.to_string(),
            force,
        });
        let mut state = self.state.lock().unwrap();
        if !state.branches.contains_key(branch) {
            return Err(Error::NotFound {
                what: "branch",
                name: branch.to_string(),
            });
        }
        state
            .branches
            .insert(branch.to_string(), revision.to_string());
        Ok(())
    }

    async fn create_branch(&self, branch: &str, revision: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.branches.contains_key(branch) {
            return Err(Error::AlreadyExists {
                what: "branch",
                name: branch.to_string(),
            });
        }
        state
            .branches
            .insert(branch.to_string(), revision.to_string());
        Ok(())
    }

    async fn ensure_branch(&self, branch: &str, revision: &str) -> Result<()> {
        match self.create_branch(branch, revision).await {
            Err(err) if err.is_already_exists() => self.point_branch(branch, revision, true).await,
            other => other,
        }
    }

    async fn create_tag(&self, name: &str, message: &str, revision: &str) -> Result<()> {
        self.create_tag_calls.lock().unwrap().push(CreateTagCall {
            name: name.to_string(),
            revision: revision.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        if state.tags.contains_key(name) {
            return Err(Error::AlreadyExists {
                what: "tag",
                name: name.to_string(),
            });
        }
        state.tags.insert(
            name.to_string(),
            ReleaseTag {
                name: name.to_string(),
                revision: revision.to_string(),
                message: Some(message.to_string()),
                metadata: parse_metadata(message),
            },
        );
        Ok(())
    }

    async fn get_tag(&self, name: &str) -> Result<Option<ReleaseTag>> {
        Ok(self.state.lock().unwrap().tags.get(name).cloned())
    }

    async fn find_open_pr(&self, head: &str, base: &str) -> Result<Option<PullRequest>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .prs
            .iter()
            .find(|pr| !pr.merged && pr.head_ref == head && pr.base_ref == base)
            .cloned())
    }

    async fn find_merged_pr(&self, head: &str) -> Result<Option<PullRequest>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .prs
            .iter()
            .rev()
            .find(|pr| pr.merged && pr.head_ref == head)
            .cloned())
    }

    async fn get_pr(&self, number: u64) -> Result<Option<PullRequest>> {
        Ok(self.pr(number))
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
        });
        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let pr = PullRequest {
            number,
            html_url: format!("https://example.test/pr/{number}"),
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            merged: false,
        };
        self.state.lock().unwrap().prs.push(pr.clone());
        Ok(pr)
    }

    async fn update_pr(&self, number: u64, title: &str, body: &str) -> Result<()> {
        self.update_pr_calls.lock().unwrap().push(UpdatePrCall {
            number,
            title: title.to_string(),
            body: body.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        let pr = state
            .prs
            .iter_mut()
            .find(|pr| pr.number == number)
            .ok_or(Error::NotFound {
                what: "pull request",
                name: number.to_string(),
            })?;
        pr.title = title.to_string();
        pr.body = body.to_string();
        Ok(())
    }

    async fn create_release(&self, tag: &str, name: &str, body: &str) -> Result<()> {
        if let Some(msg) = self.error_on_create_release.lock().unwrap().take() {
            return Err(Error::Host {
                message: msg,
                status: Some(500),
            });
        }
        self.create_release_calls
            .lock()
            .unwrap()
            .push(CreateReleaseCall {
                tag: tag.to_string(),
                name: name.to_string(),
                body: body.to_string(),
            });
        let mut state = self.state.lock().unwrap();
        if state.releases.contains_key(tag) {
            return Err(Error::AlreadyExists {
                what: "release",
                name: tag.to_string(),
            });
        }
        state
            .releases
            .insert(tag.to_string(), (name.to_string(), body.to_string()));
        Ok(())
    }

    async fn release_exists(&self, tag: &str) -> Result<bool> {
        Ok(self.state.lock().unwrap().releases.contains_key(tag))
    }
}
