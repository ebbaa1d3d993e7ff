//! Finalize workflow
//!
//! Cuts the tag and release once a proposal lands on the target branch.
//! Self-healing and safe to run unconditionally on every push: a managed tag
//! that already exists means the release is done (modulo backfilling a
//! missing release object), and "already exists" from any host call is a
//! success outcome, never an error. This makes concurrent runs idempotent
//! without distributed locking - the tag's existence is the lock.

use crate::changelog::extract_entry;
use crate::config::PlsConfig;
use crate::error::{Error, Result};
use crate::manifest::{MANIFEST_PATH, Manifest};
use crate::metadata::parse_metadata;
use crate::orchestrate::{CHANGELOG_PATH, manifest_needle, release_message, tag_name};
use crate::ports::{CodeHost, LocalRepository};
use crate::selection::strip_options_block;
use crate::types::ReleaseMetadata;
use crate::version::{ReleaseKind, Version};
use tracing::{info, warn};

/// Result of the finalize workflow
#[derive(Debug)]
pub enum FinalizeOutcome {
    /// No manifest on the target branch; nothing to release
    NothingToRelease,
    /// The managed tag already existed; no new writes were performed
    AlreadyReleased {
        /// The released version
        version: Version,
        /// Whether a missing release object was backfilled
        release_backfilled: bool,
    },
    /// The tag and release were created
    Released {
        /// The released version
        version: Version,
        /// The created tag name
        tag: String,
    },
}

/// Run the finalize workflow
pub async fn finalize(
    repo: &dyn LocalRepository,
    host: &dyn CodeHost,
    config: &PlsConfig,
) -> Result<FinalizeOutcome> {
    let head = host
        .branch_revision(&config.target_branch)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: "branch",
            name: config.target_branch.clone(),
        })?;

    // Fast path: the HEAD commit carries structured metadata
    let head_metadata = parse_metadata(&repo.commit_message(&head).await?);

    let metadata = match head_metadata.clone() {
        Some(metadata) => metadata,
        // Recovery path: reconstruct intent from the manifest, e.g. after a
        // squash merge discarded the metadata commit message
        None => match recover_metadata(repo, host, config).await? {
            Some(metadata) => metadata,
            None => return Ok(FinalizeOutcome::NothingToRelease),
        },
    };

    let version = metadata.version.clone();
    let tag = tag_name(&version);

    if let Some(existing) = host.get_tag(&tag).await? {
        if !existing.is_managed_release() {
            // A human-made tag is squatting on the release name; never
            // overwrite it or treat it as our release
            return Err(Error::AlreadyExists {
                what: "unmanaged tag",
                name: tag,
            });
        }
        let release_backfilled = if host.release_exists(&tag).await? {
            false
        } else {
            // Covers a crash between tag and release creation
            warn!(%tag, "managed tag exists without a release; backfilling");
            let body = release_body(host, config, &version).await?;
            tolerate_existing(host.create_release(&tag, &version.to_string(), &body).await)?;
            true
        };
        return Ok(FinalizeOutcome::AlreadyReleased {
            version,
            release_backfilled,
        });
    }

    // Prefer the metadata commit itself; otherwise search history for the
    // commit that wrote the version into the manifest
    let revision = if head_metadata.is_some() {
        head.clone()
    } else {
        repo.find_commit_by_content(&manifest_needle(&version), MANIFEST_PATH)
            .await?
            .unwrap_or(head)
    };

    info!(%tag, %revision, "creating release tag");
    tolerate_existing(
        host.create_tag(&tag, &release_message(&metadata), &revision)
            .await,
    )?;

    let body = release_body(host, config, &version).await?;
    tolerate_existing(host.create_release(&tag, &version.to_string(), &body).await)?;

    Ok(FinalizeOutcome::Released { version, tag })
}

/// A concurrent run winning the race to create the same object is success
fn tolerate_existing(result: Result<()>) -> Result<()> {
    match result {
        Err(err) if err.is_already_exists() => {
            info!(code = err.code(), "object already created by a concurrent run");
            Ok(())
        }
        other => other,
    }
}

async fn recover_metadata(
    repo: &dyn LocalRepository,
    host: &dyn CodeHost,
    config: &PlsConfig,
) -> Result<Option<ReleaseMetadata>> {
    let Some(manifest_text) = host.read_file(MANIFEST_PATH, &config.target_branch).await? else {
        return Ok(None);
    };
    let version = Manifest::parse(&manifest_text)?.root_version()?;

    // The commit that introduced the version may still carry the block
    if let Some(revision) = repo
        .find_commit_by_content(&manifest_needle(&version), MANIFEST_PATH)
        .await?
    {
        if let Some(metadata) = parse_metadata(&repo.commit_message(&revision).await?) {
            return Ok(Some(metadata));
        }
    }

    // Last resort: infer the transition from the changelog history
    let from = host
        .read_file(CHANGELOG_PATH, &config.target_branch)
        .await?
        .and_then(|changelog| previous_version(&changelog, &version))
        .unwrap_or_else(|| version.clone());

    warn!(%version, %from, "reconstructed release intent without metadata");
    Ok(Some(ReleaseMetadata {
        kind: infer_kind(&from, &version),
        version,
        from,
    }))
}

/// Second version heading in the changelog (the release before `version`)
fn previous_version(changelog: &str, version: &Version) -> Option<Version> {
    changelog
        .lines()
        .filter_map(|line| line.strip_prefix("## "))
        .filter_map(|rest| Version::parse(rest.split_whitespace().next()?))
        .find(|v| v != version)
}

/// Classify the transition `from -> to` when no recorded kind survives
fn infer_kind(from: &Version, to: &Version) -> ReleaseKind {
    if to.major > from.major {
        ReleaseKind::Major
    } else if to.minor > from.minor {
        ReleaseKind::Minor
    } else if to.patch > from.patch {
        ReleaseKind::Patch
    } else {
        ReleaseKind::Transition
    }
}

/// Release-note body: the changelog entry for the version, falling back to
/// the merged proposal's description with the options block stripped
async fn release_body(
    host: &dyn CodeHost,
    config: &PlsConfig,
    version: &Version,
) -> Result<String> {
    if let Some(changelog) = host.read_file(CHANGELOG_PATH, &config.target_branch).await? {
        if let Some(entry) = extract_entry(&changelog, &version.to_string()) {
            return Ok(entry.to_string());
        }
    }
    if let Some(pr) = host.find_merged_pr(&config.release_branch).await? {
        return Ok(strip_options_block(&pr.body));
    }
    Ok(String::new())
}
