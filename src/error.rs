//! Error types for pls-release
//!
//! Every domain error carries a stable machine-readable code plus structured
//! context so calling tooling can branch on cause instead of parsing strings.

use thiserror::Error;

/// Result alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during release workflows
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration is missing or invalid
    #[error("configuration error: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// An invalid release strategy value was supplied
    #[error("invalid release strategy: {value} (expected \"simple\" or \"two-branch\")")]
    InvalidStrategy {
        /// The rejected strategy value
        value: String,
    },

    /// A required object does not exist
    #[error("{what} not found: {name}")]
    NotFound {
        /// Kind of object (branch, tag, file, ...)
        what: &'static str,
        /// Name of the missing object
        name: String,
    },

    /// An object already exists on the host
    ///
    /// The orchestrator treats this as a success outcome for tag/release
    /// creation; it is only fatal when it signals a genuine conflict, e.g.
    /// an unmanaged tag squatting on a release tag name.
    #[error("{what} already exists: {name}")]
    AlreadyExists {
        /// Kind of object (tag, release, branch, ...)
        what: &'static str,
        /// Name of the conflicting object
        name: String,
    },

    /// A version string could not be parsed
    #[error("invalid version: {input}")]
    InvalidVersion {
        /// The rejected input
        input: String,
    },

    /// Code host API error
    #[error("host error: {message}")]
    Host {
        /// Host-reported message
        message: String,
        /// HTTP status when available
        status: Option<u16>,
    },

    /// A git command failed
    #[error("git {command} failed: {message}")]
    Git {
        /// The git subcommand that failed
        command: String,
        /// Captured stderr
        message: String,
    },

    /// Authentication failure
    #[error("authentication error: {0}")]
    Auth(String),

    /// Failed to parse repository data (remote URL, manifest, PR body)
    #[error("parse error: {0}")]
    Parse(String),

    /// Underlying I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable machine-readable code for this error
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::InvalidStrategy { .. } => "invalid_strategy",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyExists { .. } => "already_exists",
            Self::InvalidVersion { .. } => "invalid_version",
            Self::Host { .. } => "host",
            Self::Git { .. } => "git",
            Self::Auth(_) => "auth",
            Self::Parse(_) => "parse",
            Self::Io(_) => "io",
        }
    }

    /// Whether this error means "the object was already there"
    pub const fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code.as_u16();
                if is_conflict(status, &source.message, source.errors.as_deref()) {
                    Self::AlreadyExists {
                        what: "host object",
                        name: source.message,
                    }
                } else if status == 404 {
                    Self::NotFound {
                        what: "host object",
                        name: source.message,
                    }
                } else {
                    Self::Host {
                        message: source.message,
                        status: Some(status),
                    }
                }
            }
            other => Self::Host {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

/// Decide whether a host response means "already exists".
///
/// 409 is always a conflict. 422 is GitHub's validation status; it only means
/// "exists" when the structured error list says `already_exists` or the
/// message does (the git refs API reports "Reference already exists" with no
/// error code).
fn is_conflict(status: u16, message: &str, errors: Option<&[serde_json::Value]>) -> bool {
    if status == 409 {
        return true;
    }
    if status != 422 {
        return false;
    }
    if let Some(errors) = errors {
        if errors
            .iter()
            .any(|e| e.get("code").and_then(|c| c.as_str()) == Some("already_exists"))
        {
            return true;
        }
    }
    message.to_lowercase().contains("already exists")
}
