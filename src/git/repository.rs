use crate::boundary::BoundaryWarning;
use crate::domain::Commit;
use crate::error::{ChangelogError, Result};
use chrono::{DateTime, TimeZone, Utc};
use git2::{Oid, Repository as Git2Repo, Sort};
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    /// Workdir-relative directory that changed files are reported against
    scope: Option<String>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::discover(path).map_err(|e| {
            ChangelogError::environment(format!(
                "'{}' is not inside a git repository: {}",
                path.display(),
                e.message()
            ))
        })?;

        Ok(Git2Repository { repo, scope: None })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo, scope: None }
    }

    /// Report changed files relative to `dir` and drop files outside it
    ///
    /// Used when the workspace root is below the repository root.
    pub fn scoped_to(mut self, dir: &Path) -> Result<Self> {
        let Some(workdir) = self.workdir() else {
            return Err(ChangelogError::environment("repository has no working tree"));
        };
        let workdir = workdir.canonicalize()?;
        let dir = dir.canonicalize()?;
        let relative = dir.strip_prefix(&workdir).map_err(|_| {
            ChangelogError::environment(format!(
                "'{}' is outside the repository at '{}'",
                dir.display(),
                workdir.display()
            ))
        })?;

        let scope = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        self.scope = (!scope.is_empty()).then_some(scope);
        Ok(self)
    }

    /// Root of the working tree, `None` for bare repositories
    pub fn workdir(&self) -> Option<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf)
    }

    fn head_oid(&self) -> Result<Option<Oid>> {
        match self.repo.head() {
            Ok(reference) => Ok(reference.target()),
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, hash: &str) -> Option<Oid> {
        self.repo
            .revparse_single(hash)
            .and_then(|object| object.peel_to_commit())
            .map(|commit| commit.id())
            .ok()
    }

    fn changed_files(&self, commit: &git2::Commit<'_>) -> std::result::Result<Vec<String>, git2::Error> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut files = Vec::new();
        for delta in diff.deltas() {
            let path = delta.new_file().path().or_else(|| delta.old_file().path());
            let Some(path) = path else {
                continue;
            };
            let path = path.to_string_lossy().replace('\\', "/");
            match &self.scope {
                Some(scope) => {
                    if let Some(rest) = path.strip_prefix(scope.as_str()).and_then(|r| r.strip_prefix('/')) {
                        files.push(rest.to_string());
                    }
                }
                None => files.push(path),
            }
        }
        Ok(files)
    }
}

impl super::Repository for Git2Repository {
    fn head_commit_hash(&self) -> Result<Option<String>> {
        Ok(self.head_oid()?.map(|oid| oid.to_string()))
    }

    fn commits_since(&self, since: Option<&str>) -> Result<Vec<Commit>> {
        let Some(head) = self.head_oid()? else {
            return Ok(Vec::new());
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head)?;

        if let Some(hash) = since {
            match self.resolve(hash) {
                Some(oid) => revwalk.hide(oid)?,
                None => tracing::debug!(hash, "since-commit not found, walking full history"),
            }
        }

        let mut commits = Vec::new();

        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;

            let message = commit.message().unwrap_or("(empty message)").to_string();
            let author = commit.author().name().unwrap_or("unknown").to_string();
            let timestamp: DateTime<Utc> = Utc
                .timestamp_opt(commit.time().seconds(), 0)
                .single()
                .unwrap_or_default();

            let files = self.changed_files(&commit).unwrap_or_else(|e| {
                BoundaryWarning::CommitFilesUnavailable {
                    hash: oid.to_string(),
                    reason: e.message().to_string(),
                }
                .emit();
                Vec::new()
            });

            commits.push(Commit::new(oid.to_string(), message, author, timestamp, files));
        }

        commits.reverse();
        Ok(commits)
    }

    fn contains_commit(&self, hash: &str) -> Result<bool> {
        Ok(self.resolve(hash).is_some())
    }
}
