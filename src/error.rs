//! Error types shared by the walker and its content collaborators

use thiserror::Error;

/// Boxed error carried through from a collaborator or a visitor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can go wrong while resolving or decoding repository content.
#[derive(Debug, Error)]
pub enum Error {
    /// The path has no matching child in its parent's listing.
    #[error("no such path found: {path}")]
    NotFound { path: String },

    /// A listing was requested for a path that is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// The collaborator call failed (network, auth, rate limit, ...).
    #[error("{0}")]
    Transport(#[source] BoxError),

    /// Detail content could not be decoded per its declared encoding.
    #[error("failed to decode content of {path}: {reason}")]
    Decode { path: String, reason: String },

    /// `content()` was called on an entry that carries no file content.
    #[error("entry {path} carries no file content; enable file detail to fetch it")]
    MissingDetail { path: String },

    #[error("walk cancelled")]
    Cancelled,

    #[error("walk deadline exceeded")]
    DeadlineExceeded,

    #[error("git: {0}")]
    Git(#[from] git2::Error),

    #[error("malformed contents response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid filter pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Caller-defined cause returned by a visitor to abort the walk.
    #[error("{0}")]
    Visitor(#[source] BoxError),
}

impl Error {
    pub fn not_found(path: impl Into<String>) -> Self {
        Error::NotFound { path: path.into() }
    }

    pub fn transport(err: impl Into<BoxError>) -> Self {
        Error::Transport(err.into())
    }

    pub fn visitor(err: impl Into<BoxError>) -> Self {
        Error::Visitor(err.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True for failures of the collaborator call itself, including
    /// cancellation observed at a call boundary.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_)
                | Error::Cancelled
                | Error::DeadlineExceeded
                | Error::Git(_)
                | Error::Json(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_message_is_preserved() {
        let err = Error::transport("API rate limit exceeded");
        assert_eq!(err.to_string(), "API rate limit exceeded");
        assert!(err.is_transport());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_names_path() {
        let err = Error::not_found("testdata/non_existent");
        assert_eq!(err.to_string(), "no such path found: testdata/non_existent");
        assert!(err.is_not_found());
    }
}
