//! Source-control log reader
//!
//! This module provides a trait-based abstraction over the repository
//! history, so the planning code can run against a real repository or an
//! in-memory history in tests.
//!
//! # Overview
//!
//! - [repository::Git2Repository]: reads history with the `git2` crate
//! - [mock::MockRepository]: a fixed, in-memory history
//!
//! # Usage
//!
//! ```rust
//! # use workspace_changelog::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> workspace_changelog::Result<()> {
//! let commits = repo.commits_since(None)?;
//! for commit in &commits {
//!     println!("{} {} ({} files)", commit.short_hash(), commit.subject(), commit.files.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::Commit;
use crate::error::Result;

/// History access needed by the update workflow
///
/// ## Error Handling
///
/// Failures reading the commit graph are errors. Failures reading the file
/// list of a single commit are not: implementations log a
/// [crate::boundary::BoundaryWarning::CommitFilesUnavailable] and report the
/// commit with an empty file list.
pub trait Repository {
    /// Hash of the commit HEAD points at, `None` for a repository without commits
    fn head_commit_hash(&self) -> Result<Option<String>>;

    /// Commits reachable from HEAD, oldest first
    ///
    /// With `since`, only commits that are not ancestors of `since` (and not
    /// `since` itself) are returned. An unknown `since` yields the whole history.
    ///
    /// # Example
    /// ```rust
    /// # use workspace_changelog::git::Repository;
    /// # fn example<R: Repository>(repo: &R) -> workspace_changelog::Result<()> {
    /// if let Some(head) = repo.head_commit_hash()? {
    ///     assert!(repo.commits_since(Some(&head))?.is_empty());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn commits_since(&self, since: Option<&str>) -> Result<Vec<Commit>>;

    /// Whether `hash` names a commit of this repository
    fn contains_commit(&self, hash: &str) -> Result<bool>;
}
