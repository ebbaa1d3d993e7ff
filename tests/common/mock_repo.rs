//! Scripted local repository for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use pls_release::error::{Error, Result};
use pls_release::ports::LocalRepository;
use pls_release::types::Commit;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Scripted mock of the local repository port.
///
/// History queries answer from seeded maps; the branch-sync operations
/// (rebase, force-push) consume scripted result queues so retry loops can be
/// driven deterministically.
pub struct MockRepo {
    files: Mutex<HashMap<String, String>>,
    commits: Mutex<Vec<Commit>>,
    commit_messages: Mutex<HashMap<String, String>>,
    commits_by_content: Mutex<HashMap<String, String>>,
    tag_revisions: Mutex<HashMap<String, String>>,
    tag_messages: Mutex<HashMap<String, String>>,
    head: Mutex<String>,
    // Scripted outcomes, consumed front to back (empty queue means success)
    rebase_results: Mutex<VecDeque<bool>>,
    push_lease_results: Mutex<VecDeque<bool>>,
    // Call tracking
    commits_since_calls: Mutex<Vec<Option<String>>>,
    fetch_calls: Mutex<Vec<String>>,
    checkout_calls: Mutex<Vec<String>>,
    rebase_calls: Mutex<Vec<String>>,
    push_lease_calls: Mutex<Vec<(String, String)>>,
}

impl Default for MockRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRepo {
    /// Create an empty mock repository
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            commits: Mutex::new(Vec::new()),
            commit_messages: Mutex::new(HashMap::new()),
            commits_by_content: Mutex::new(HashMap::new()),
            tag_revisions: Mutex::new(HashMap::new()),
            tag_messages: Mutex::new(HashMap::new()),
            head: Mutex::new("head-0".to_string()),
            rebase_results: Mutex::new(VecDeque::new()),
            push_lease_results: Mutex::new(VecDeque::new()),
            commits_since_calls: Mutex::new(Vec::new()),
            fetch_calls: Mutex::new(Vec::new()),
            checkout_calls: Mutex::new(Vec::new()),
            rebase_calls: Mutex::new(Vec::new()),
            push_lease_calls: Mutex::new(Vec::new()),
        }
    }

    // === Seeding ===

    /// Set the classified commits returned by `commits_since`
    pub fn seed_commits(&self, commits: Vec<Commit>) {
        *self.commits.lock().unwrap() = commits;
    }

    /// Seed the full message of a revision
    pub fn seed_commit_message(&self, revision: &str, message: &str) {
        self.commit_messages
            .lock()
            .unwrap()
            .insert(revision.to_string(), message.to_string());
    }

    /// Seed the revision returned by `find_commit_by_content` for a needle
    pub fn seed_commit_by_content(&self, needle: &str, revision: &str) {
        self.commits_by_content
            .lock()
            .unwrap()
            .insert(needle.to_string(), revision.to_string());
    }

    /// Seed a local tag
    pub fn seed_tag(&self, name: &str, revision: &str, message: Option<&str>) {
        self.tag_revisions
            .lock()
            .unwrap()
            .insert(name.to_string(), revision.to_string());
        if let Some(message) = message {
            self.tag_messages
                .lock()
                .unwrap()
                .insert(name.to_string(), message.to_string());
        }
    }

    /// Script the outcomes of successive `rebase` calls
    pub fn script_rebase_results(&self, results: &[bool]) {
        *self.rebase_results.lock().unwrap() = results.iter().copied().collect();
    }

    /// Script the outcomes of successive `push_force_with_lease` calls
    pub fn script_push_lease_results(&self, results: &[bool]) {
        *self.push_lease_results.lock().unwrap() = results.iter().copied().collect();
    }

    // === Verification ===

    /// Arguments of every `commits_since` call
    pub fn commits_since_calls(&self) -> Vec<Option<String>> {
        self.commits_since_calls.lock().unwrap().clone()
    }

    /// Remotes fetched
    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.lock().unwrap().clone()
    }

    /// Branches checked out
    pub fn checkout_calls(&self) -> Vec<String> {
        self.checkout_calls.lock().unwrap().clone()
    }

    /// Branches rebased onto
    pub fn rebase_calls(&self) -> Vec<String> {
        self.rebase_calls.lock().unwrap().clone()
    }

    /// (remote, branch) pairs force-pushed with lease
    pub fn push_lease_calls(&self) -> Vec<(String, String)> {
        self.push_lease_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocalRepository for MockRepo {
    async fn read_file(&self, path: &str) -> Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or(Error::NotFound {
                what: "file",
                name: path.to_string(),
            })
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn file_exists(&self, path: &str) -> Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(path))
    }

    async fn commit(&self, _message: &str) -> Result<String> {
        Ok(self.head.lock().unwrap().clone())
    }

    async fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self.head.lock().unwrap().clone();
        self.seed_tag(name, &head, Some(message));
        Ok(())
    }

    async fn tag_revision(&self, name: &str) -> Result<Option<String>> {
        Ok(self.tag_revisions.lock().unwrap().get(name).cloned())
    }

    async fn tag_message(&self, name: &str) -> Result<Option<String>> {
        Ok(self.tag_messages.lock().unwrap().get(name).cloned())
    }

    async fn commits_since(&self, revision: Option<&str>) -> Result<Vec<Commit>> {
        self.commits_since_calls
            .lock()
            .unwrap()
            .push(revision.map(ToString::to_string));
        Ok(self.commits.lock().unwrap().clone())
    }

    async fn head_revision(&self) -> Result<String> {
        Ok(self.head.lock().unwrap().clone())
    }

    async fn commit_message(&self, revision: &str) -> Result<String> {
        Ok(self
            .commit_messages
            .lock()
            .unwrap()
            .get(revision)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_commit_by_content(&self, needle: &str, _path: &str) -> Result<Option<String>> {
        Ok(self.commits_by_content.lock().unwrap().get(needle).cloned())
    }

    async fn push(&self, _refspec: &str) -> Result<()> {
        Ok(())
    }

    async fn fetch(&self, remote: &str) -> Result<()> {
        self.fetch_calls.lock().unwrap().push(remote.to_string());
        Ok(())
    }

    async fn checkout_branch(&self, branch: &str) -> Result<()> {
        self.checkout_calls.lock().unwrap().push(branch.to_string());
        Ok(())
    }

    async fn rebase(&self, onto: &str) -> Result<bool> {
        self.rebase_calls.lock().unwrap().push(onto.to_string());
        Ok(self.rebase_results.lock().unwrap().pop_front().unwrap_or(true))
    }

    async fn push_force_with_lease(&self, remote: &str, branch: &str) -> Result<bool> {
        self.push_lease_calls
            .lock()
            .unwrap()
            .push((remote.to_string(), branch.to_string()));
        Ok(self
            .push_lease_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(true))
    }
}
