//! Release automation from conventional commits.
//!
//! `pls` watches an integration branch, classifies its commits, and keeps a
//! single release proposal PR open with the computed next version, an updated
//! changelog, and a selectable list of alternative versions. Merging the
//! proposal releases it: a `finalize` run cuts the annotated tag and the host
//! release, and both steps are idempotent so they can run on every push.
//!
//! The core workflows in [`orchestrate`] depend only on the two ports in
//! [`ports`]; the [`repo`] and [`host`] modules provide the git-CLI and
//! GitHub adapters.

pub mod auth;
pub mod branch_sync;
pub mod changelog;
pub mod commit;
pub mod config;
pub mod error;
pub mod host;
pub mod manifest;
pub mod metadata;
pub mod orchestrate;
pub mod ports;
pub mod repo;
pub mod selection;
pub mod types;
pub mod version;

pub use config::{PlsConfig, Strategy};
pub use error::{Error, Result};
pub use types::{Commit, CommitType, PullRequest, ReleaseMetadata, VersionBump};
pub use version::{BumpKind, ReleaseKind, Stage, StageTarget, Version};
