use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{Commit, Package, PackageSet};
use crate::error::Result;
use crate::git::Repository;
use indexmap::IndexMap;

/// Whether `commit` changed a file inside the package directory
///
/// Matching is per path component: `packages/ui` owns `packages/ui/x.js`
/// but not `packages/ui-kit/x.js`. A package at the workspace root owns
/// every file.
pub fn touches(package: &Package, commit: &Commit) -> bool {
    let prefix = package.relative_path.trim_matches('/');
    if prefix.is_empty() {
        return !commit.files.is_empty();
    }
    commit.files.iter().any(|file| {
        file.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Group commits by the packages whose directory they touch
///
/// Every package gets an entry, possibly empty. A commit touching several
/// packages is listed under each of them; commits keep their order.
pub fn attribute(commits: &[Commit], packages: &PackageSet) -> IndexMap<String, Vec<Commit>> {
    packages
        .iter()
        .map(|package| {
            let owned = commits
                .iter()
                .filter(|commit| touches(package, commit))
                .cloned()
                .collect();
            (package.name.clone(), owned)
        })
        .collect()
}

/// Commits whose type tag passes the configured allow-list
pub fn filter_commits(commits: &[Commit], config: &Config) -> Vec<Commit> {
    commits
        .iter()
        .filter(|c| config.accepts_type(c.commit_type.as_deref()))
        .cloned()
        .collect()
}

/// Commits each package has not incorporated yet
///
/// `last_commit` returns the cached hash of a package. Everything reachable
/// from that hash counts as seen, whichever package it touched, so a branch
/// commit merged after the last run is still pending. An unknown hash logs
/// a warning and the whole history is used. The history is read once per
/// distinct cached hash.
pub fn pending_commits<R, F>(
    repo: &R,
    packages: &PackageSet,
    config: &Config,
    last_commit: F,
) -> Result<IndexMap<String, Vec<Commit>>>
where
    R: Repository,
    F: Fn(&str) -> Option<String>,
{
    let mut unseen_by_hash: IndexMap<Option<String>, Vec<Commit>> = IndexMap::new();
    let mut pending = IndexMap::new();

    for package in packages.iter() {
        let since = match last_commit(&package.name) {
            Some(hash) if repo.contains_commit(&hash)? => Some(hash),
            Some(hash) => {
                BoundaryWarning::CachedCommitNotFound {
                    package: package.name.clone(),
                    hash,
                }
                .emit();
                None
            }
            None => None,
        };

        if !unseen_by_hash.contains_key(&since) {
            let unseen = repo.commits_since(since.as_deref())?;
            unseen_by_hash.insert(since.clone(), unseen);
        }
        let unseen = unseen_by_hash.get(&since).map(Vec::as_slice).unwrap_or(&[]);

        let commits = unseen
            .iter()
            .filter(|commit| touches(package, commit))
            .filter(|commit| config.accepts_type(commit.commit_type.as_deref()))
            .cloned()
            .collect::<Vec<_>>();
        tracing::debug!(package = %package.name, pending = commits.len(), "pending commits");
        pending.insert(package.name.clone(), commits);
    }

    Ok(pending)
}
