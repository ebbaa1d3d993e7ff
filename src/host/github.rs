//! GitHub code host implementation
//!
//! Implements the [`CodeHost`] port with octocrab. Multi-file commits use the
//! git data API (blob → tree → commit) so a proposal is always one atomic
//! commit relative to the base head.

use crate::error::{Error, Result};
use crate::host::HostConfig;
use crate::metadata::parse_metadata;
use crate::ports::{CodeHost, FileSet};
use crate::types::{PullRequest, ReleaseTag};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde_json::{Value, json};
use tracing::debug;

/// GitHub host adapter
pub struct GitHubHost {
    client: Octocrab,
    config: HostConfig,
}

impl GitHubHost {
    /// Create a new GitHub host adapter
    pub fn new(token: &str, config: HostConfig) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(ref h) = config.host {
            let base_url = format!("https://{h}/api/v3");
            builder = builder.base_uri(&base_url).map_err(|e| Error::Host {
                message: e.to_string(),
                status: None,
            })?;
        }

        let client = builder.build().map_err(|e| Error::Host {
            message: e.to_string(),
            status: None,
        })?;

        Ok(Self { client, config })
    }

    fn repo_route(&self, tail: &str) -> String {
        format!("/repos/{}/{}/{tail}", self.config.owner, self.config.repo)
    }

    async fn get_json(&self, route: &str) -> Result<Value> {
        Ok(self.client.get(route, None::<&()>).await?)
    }

    async fn post_json(&self, route: &str, body: &Value) -> Result<Value> {
        Ok(self.client.post(route, Some(body)).await?)
    }

    fn map_pr(pr: octocrab::models::pulls::PullRequest) -> PullRequest {
        PullRequest {
            number: pr.number,
            html_url: pr
                .html_url
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            base_ref: pr.base.ref_field.clone(),
            head_ref: pr.head.ref_field.clone(),
            title: pr.title.as_deref().unwrap_or_default().to_string(),
            body: pr.body.as_deref().unwrap_or_default().to_string(),
            merged: pr.merged_at.is_some(),
        }
    }
}

/// Collapse a not-found error into `None`
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::NotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

fn str_field<'a>(value: &'a Value, pointer: &str) -> Result<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Parse(format!("missing {pointer} in host response")))
}

#[async_trait]
impl CodeHost for GitHubHost {
    async fn read_file(&self, path: &str, reference: &str) -> Result<Option<String>> {
        let result = self
            .client
            .repos(&self.config.owner, &self.config.repo)
            .get_content()
            .path(path)
            .r#ref(reference)
            .send()
            .await
            .map_err(Error::from);

        match optional(result)? {
            None => Ok(None),
            Some(mut contents) => {
                let item = contents.items.pop().ok_or_else(|| {
                    Error::Parse(format!("no content returned for {path}@{reference}"))
                })?;
                let decoded = item
                    .decoded_content()
                    .ok_or_else(|| Error::Parse(format!("cannot decode {path}@{reference}")))?;
                Ok(Some(decoded))
            }
        }
    }

    async fn commit_files(&self, files: &FileSet, message: &str, parent: &str) -> Result<String> {
        debug!(parent, files = files.len(), "creating host commit");

        let mut tree = Vec::with_capacity(files.len());
        for (path, content) in files {
            let blob = self
                .post_json(
                    &self.repo_route("git/blobs"),
                    &json!({ "content": content, "encoding": "utf-8" }),
                )
                .await?;
            tree.push(json!({
                "path": path,
                "mode": "100644",
                "type": "blob",
                "sha": str_field(&blob, "/sha")?,
            }));
        }

        let parent_commit = self
            .get_json(&self.repo_route(&format!("git/commits/{parent}")))
            .await?;
        let base_tree = str_field(&parent_commit, "/tree/sha")?;

        let new_tree = self
            .post_json(
                &self.repo_route("git/trees"),
                &json!({ "base_tree": base_tree, "tree": tree }),
            )
            .await?;

        let commit = self
            .post_json(
                &self.repo_route("git/commits"),
                &json!({
                    "message": message,
                    "tree": str_field(&new_tree, "/sha")?,
                    "parents": [parent],
                }),
            )
            .await?;

        Ok(str_field(&commit, "/sha")?.to_string())
    }

    async fn branch_revision(&self, branch: &str) -> Result<Option<String>> {
        let result = self
            .get_json(&self.repo_route(&format!("git/ref/heads/{branch}")))
            .await;
        match optional(result)? {
            None => Ok(None),
            Some(reference) => Ok(Some(str_field(&reference, "/object/sha")?.to_string())),
        }
    }

    async fn point_branch(&self, branch: &str, revision: &str, force: bool) -> Result<()> {
        debug!(branch, revision, force, "moving branch pointer");
        let _: Value = self
            .client
            .patch(
                self.repo_route(&format!("git/refs/heads/{branch}")),
                Some(&json!({ "sha": revision, "force": force })),
            )
            .await?;
        Ok(())
    }

    async fn create_branch(&self, branch: &str, revision: &str) -> Result<()> {
        self.post_json(
            &self.repo_route("git/refs"),
            &json!({ "ref": format!("refs/heads/{branch}"), "sha": revision }),
        )
        .await?;
        Ok(())
    }

    async fn ensure_branch(&self, branch: &str, revision: &str) -> Result<()> {
        match self.create_branch(branch, revision).await {
            Err(err) if err.is_already_exists() => self.point_branch(branch, revision, true).await,
            other => other,
        }
    }

    async fn create_tag(&self, name: &str, message: &str, revision: &str) -> Result<()> {
        let tag = self
            .post_json(
                &self.repo_route("git/tags"),
                &json!({
                    "tag": name,
                    "message": message,
                    "object": revision,
                    "type": "commit",
                }),
            )
            .await?;

        self.post_json(
            &self.repo_route("git/refs"),
            &json!({
                "ref": format!("refs/tags/{name}"),
                "sha": str_field(&tag, "/sha")?,
            }),
        )
        .await?;
        Ok(())
    }

    async fn get_tag(&self, name: &str) -> Result<Option<ReleaseTag>> {
        let result = self
            .get_json(&self.repo_route(&format!("git/ref/tags/{name}")))
            .await;
        let Some(reference) = optional(result)? else {
            return Ok(None);
        };

        let object_sha = str_field(&reference, "/object/sha")?.to_string();
        let object_type = str_field(&reference, "/object/type")?;

        // Lightweight tags point straight at a commit and carry no message
        if object_type != "tag" {
            return Ok(Some(ReleaseTag {
                name: name.to_string(),
                revision: object_sha,
                message: None,
                metadata: None,
            }));
        }

        let tag = self
            .get_json(&self.repo_route(&format!("git/tags/{object_sha}")))
            .await?;
        let message = str_field(&tag, "/message")?.to_string();
        let metadata = parse_metadata(&message);

        Ok(Some(ReleaseTag {
            name: name.to_string(),
            revision: str_field(&tag, "/object/sha")?.to_string(),
            message: Some(message),
            metadata,
        }))
    }

    async fn find_open_pr(&self, head: &str, base: &str) -> Result<Option<PullRequest>> {
        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(format!("{}:{head}", self.config.owner))
            .base(base)
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        Ok(prs.items.into_iter().next().map(Self::map_pr))
    }

    async fn find_merged_pr(&self, head: &str) -> Result<Option<PullRequest>> {
        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(format!("{}:{head}", self.config.owner))
            .state(octocrab::params::State::Closed)
            .sort(octocrab::params::pulls::Sort::Updated)
            .direction(octocrab::params::Direction::Descending)
            .send()
            .await?;

        Ok(prs
            .items
            .into_iter()
            .find(|pr| pr.merged_at.is_some())
            .map(Self::map_pr))
    }

    async fn get_pr(&self, number: u64) -> Result<Option<PullRequest>> {
        let result = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(number)
            .await
            .map_err(Error::from);
        Ok(optional(result)?.map(Self::map_pr))
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(title, head, base)
            .body(body)
            .send()
            .await?;
        Ok(Self::map_pr(pr))
    }

    async fn update_pr(&self, number: u64, title: &str, body: &str) -> Result<()> {
        self.client
            .pulls(&self.config.owner, &self.config.repo)
            .update(number)
            .title(title)
            .body(body)
            .send()
            .await?;
        Ok(())
    }

    async fn create_release(&self, tag: &str, name: &str, body: &str) -> Result<()> {
        self.client
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .create(tag)
            .name(name)
            .body(body)
            .send()
            .await?;
        Ok(())
    }

    async fn release_exists(&self, tag: &str) -> Result<bool> {
        let result = self
            .client
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .get_by_tag(tag)
            .await
            .map_err(Error::from);
        Ok(optional(result)?.is_some())
    }
}
