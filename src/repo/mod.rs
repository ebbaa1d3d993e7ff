//! Local repository adapter over the system git CLI
//!
//! Implements the [`LocalRepository`] port by shelling out to `git`, the same
//! way the auth layer shells out to `gh`. All commands run inside the
//! configured working directory; the core never reads ambient process state.

use crate::commit::classify;
use crate::error::{Error, Result};
use crate::ports::LocalRepository;
use crate::types::Commit;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Record separator for `git log` output
const RECORD_SEP: char = '\u{1e}';
/// Field separator for `git log` output
const FIELD_SEP: char = '\u{1f}';

/// A local git repository
pub struct GitRepository {
    workdir: PathBuf,
}

impl GitRepository {
    /// Open a repository at the given working directory
    pub fn open(workdir: &Path) -> Result<Self> {
        if !workdir.join(".git").exists() {
            return Err(Error::NotFound {
                what: "git repository",
                name: workdir.display().to_string(),
            });
        }
        Ok(Self {
            workdir: workdir.to_path_buf(),
        })
    }

    /// Working directory of this repository
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// URL of a remote, for repository detection
    pub async fn remote_url(&self, remote: &str) -> Result<String> {
        self.git(&["remote", "get-url", remote]).await
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        debug!(?args, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
        } else {
            Err(Error::Git {
                command: args.first().map_or_else(String::new, ToString::to_string),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    async fn git_status(&self, args: &[&str]) -> Result<bool> {
        debug!(?args, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .await?;
        Ok(output.status.success())
    }
}

#[async_trait]
impl LocalRepository for GitRepository {
    async fn read_file(&self, path: &str) -> Result<String> {
        Ok(tokio::fs::read_to_string(self.workdir.join(path)).await?)
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let full = self.workdir.join(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(tokio::fs::write(full, content).await?)
    }

    async fn file_exists(&self, path: &str) -> Result<bool> {
        Ok(self.workdir.join(path).exists())
    }

    async fn commit(&self, message: &str) -> Result<String> {
        self.git(&["add", "-A"]).await?;
        self.git(&["commit", "-m", message]).await?;
        self.git(&["rev-parse", "HEAD"]).await
    }

    async fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        self.git(&["tag", "-a", name, "-m", message]).await?;
        Ok(())
    }

    async fn tag_revision(&self, name: &str) -> Result<Option<String>> {
        let reference = format!("refs/tags/{name}^{{commit}}");
        if self
            .git_status(&["rev-parse", "--verify", "--quiet", &reference])
            .await?
        {
            Ok(Some(self.git(&["rev-parse", &reference]).await?))
        } else {
            Ok(None)
        }
    }

    async fn tag_message(&self, name: &str) -> Result<Option<String>> {
        if self.tag_revision(name).await?.is_none() {
            return Ok(None);
        }
        let message = self
            .git(&["tag", "-l", "--format=%(contents)", name])
            .await?;
        if message.is_empty() {
            Ok(None)
        } else {
            Ok(Some(message))
        }
    }

    async fn commits_since(&self, revision: Option<&str>) -> Result<Vec<Commit>> {
        let format = format!("--format=%H{FIELD_SEP}%P{FIELD_SEP}%B{RECORD_SEP}");
        let range;
        let mut args = vec!["log", &format];
        if let Some(revision) = revision {
            range = format!("{revision}..HEAD");
            args.push(&range);
        }

        let output = self.git(&args).await?;
        let mut commits = Vec::new();
        for record in output.split(RECORD_SEP) {
            let record = record.trim_start_matches('\n');
            let mut fields = record.splitn(3, FIELD_SEP);
            let (Some(hash), Some(parents), Some(message)) =
                (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            let is_merge = parents.split_whitespace().count() > 1;
            if let Some(commit) = classify(hash, message, is_merge) {
                commits.push(commit);
            }
        }
        Ok(commits)
    }

    async fn head_revision(&self) -> Result<String> {
        self.git(&["rev-parse", "HEAD"]).await
    }

    async fn commit_message(&self, revision: &str) -> Result<String> {
        self.git(&["log", "-1", "--format=%B", revision]).await
    }

    async fn find_commit_by_content(&self, needle: &str, path: &str) -> Result<Option<String>> {
        let output = self
            .git(&["log", "-S", needle, "-n", "1", "--format=%H", "--", path])
            .await?;
        if output.is_empty() {
            Ok(None)
        } else {
            Ok(Some(output))
        }
    }

    async fn push(&self, refspec: &str) -> Result<()> {
        self.git(&["push", "origin", refspec]).await?;
        Ok(())
    }

    async fn fetch(&self, remote: &str) -> Result<()> {
        self.git(&["fetch", remote]).await?;
        Ok(())
    }

    async fn checkout_branch(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", branch]).await?;
        Ok(())
    }

    async fn rebase(&self, onto: &str) -> Result<bool> {
        if self.git_status(&["rebase", onto]).await? {
            return Ok(true);
        }
        // Conflicts need a human; leave the tree clean
        self.git_status(&["rebase", "--abort"]).await?;
        Ok(false)
    }

    async fn push_force_with_lease(&self, remote: &str, branch: &str) -> Result<bool> {
        self.git_status(&["push", "--force-with-lease", remote, branch])
            .await
    }
}
