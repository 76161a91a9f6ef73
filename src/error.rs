use thiserror::Error;

use crate::planner::Conflict;

/// Unified error type for workspace-changelog operations
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Changelog error: {0}")]
    Changelog(String),

    #[error("{} version conflict(s) detected", .0.len())]
    Conflicts(Vec<Conflict>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in workspace-changelog
pub type Result<T> = std::result::Result<T, ChangelogError>;

impl ChangelogError {
    /// Create an environment error (not a repository, not a workspace root)
    pub fn environment(msg: impl Into<String>) -> Self {
        ChangelogError::Environment(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ChangelogError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ChangelogError::Version(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        ChangelogError::Manifest(msg.into())
    }

    /// Create a changelog error with context
    pub fn changelog(msg: impl Into<String>) -> Self {
        ChangelogError::Changelog(msg.into())
    }

    /// Conflicts carried by this error, if it is a conflict error
    pub fn conflicts(&self) -> Option<&[Conflict]> {
        match self {
            ChangelogError::Conflicts(conflicts) => Some(conflicts),
            _ => None,
        }
    }
}
