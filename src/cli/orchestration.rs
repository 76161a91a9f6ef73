//! Command workflows
//!
//! Each workflow takes already-parsed arguments, the repository, the
//! workspace snapshot and the configuration. None of them prompt or print;
//! interaction and display stay in `main` and [crate::ui].

use crate::analyzer::{pending_commits, resolve_targets, TargetSelection};
use crate::boundary::BoundaryWarning;
use crate::cache::{CacheStatus, IncrementalCache};
use crate::changelog::{ChangelogEntry, ChangelogMetadata, ChangelogWriter};
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::domain::{BumpType, Commit, DependencyUpdate, UpdatePlan, VersionChange};
use crate::error::{ChangelogError, Result};
use crate::git::Repository;
use crate::planner::{check, Conflict, UpdatePlanner, VersionApplier};
use crate::workspace::{DependencyGraph, ManifestStore, Workspace};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::path::PathBuf;

/// Arguments for the update workflow
///
/// Mirrors the CLI arguments without depending on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateArgs {
    pub selection: TargetSelection,
    /// Bump applied to every planned package instead of the derived one
    pub bump: Option<BumpType>,
    /// Compute the plan without writing anything
    pub dry_run: bool,
    /// Proceed even when the plan breaks declared ranges
    pub force: bool,
}

/// Result of an update run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowResult {
    pub plan: UpdatePlan,
    pub changes: Vec<VersionChange>,
    /// Conflicts that were overridden with `force`
    pub conflicts: Vec<Conflict>,
    pub dependency_updates: IndexMap<String, Vec<DependencyUpdate>>,
    pub changelogs: Vec<PathBuf>,
    pub dry_run: bool,
}

impl WorkflowResult {
    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }
}

/// Pending commits of every package, given the cache state
pub fn collect_pending<R: Repository>(
    repo: &R,
    workspace: &Workspace,
    config: &Config,
    cache: &IncrementalCache,
) -> Result<IndexMap<String, Vec<Commit>>> {
    pending_commits(repo, &workspace.packages, config, |name| {
        cache.get_last_commit(name).map(str::to_string)
    })
}

/// The `update` workflow
///
/// Plans the run, checks conflicts, then writes manifests, changelogs and
/// finally the cache. Conflicts abort before any write unless `force` is
/// set; `dry_run` stops after planning.
pub fn run_update_workflow<R: Repository, S: ManifestStore>(
    repo: &R,
    workspace: &mut Workspace,
    config: &Config,
    store: S,
    args: &UpdateArgs,
    now: DateTime<Utc>,
) -> Result<WorkflowResult> {
    let mut cache = IncrementalCache::open(config.cache_path(&workspace.root));
    let pending = collect_pending(repo, workspace, config, &cache)?;

    let targets = resolve_targets(&args.selection, &workspace.packages, &pending);
    if targets.is_empty() {
        BoundaryWarning::NoPendingChanges.emit();
        return Ok(WorkflowResult {
            dry_run: args.dry_run,
            ..WorkflowResult::default()
        });
    }

    let graph = DependencyGraph::build(&workspace.packages);
    let plan = UpdatePlanner::new(&workspace.packages, &graph).plan(&targets, &pending, args.bump);

    let conflicts = check(&workspace.packages, &graph, &plan)?;
    if !conflicts.is_empty() && !args.force {
        return Err(ChangelogError::Conflicts(conflicts));
    }

    let changes = VersionApplier::<S>::compute_changes(&workspace.packages, &plan)?;
    if args.dry_run {
        tracing::debug!(changes = changes.len(), "dry run, nothing written");
        return Ok(WorkflowResult {
            plan,
            changes,
            conflicts,
            dry_run: true,
            ..WorkflowResult::default()
        });
    }

    let applier = VersionApplier::new(store);
    let applied = applier.apply_changes(&mut workspace.packages, &changes)?;

    let head = repo.head_commit_hash()?.unwrap_or_default();
    let writer = ChangelogWriter::new(&config.changelog_file);
    let mut last_commits = IndexMap::new();
    let mut changelogs = Vec::new();

    for change in &applied.changes {
        let Some(package) = workspace.packages.get(&change.package) else {
            continue;
        };
        let commits = pending.get(&change.package).map(Vec::as_slice).unwrap_or(&[]);
        let updates = applied
            .dependency_updates
            .get(&change.package)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let last_commit = commits
            .last()
            .map(|c| c.hash.clone())
            .unwrap_or_else(|| head.clone());

        let entry = ChangelogEntry::from_commits(
            change.new_version.to_string(),
            now.date_naive(),
            commits,
            updates,
        );
        let metadata = ChangelogMetadata {
            last_commit_hash: last_commit.clone(),
            last_update_time: now,
            package_name: package.name.clone(),
            package_path: package.relative_path.clone(),
        };

        changelogs.push(writer.write_entry(package, entry, metadata)?);
        last_commits.insert(package.name.clone(), last_commit);
    }

    cache.record_last_commits_at(&head, &last_commits, now)?;

    Ok(WorkflowResult {
        plan,
        changes: applied.changes,
        conflicts,
        dependency_updates: applied.dependency_updates,
        changelogs,
        dry_run: false,
    })
}

/// Cache state and pending commits, for `status`
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub cache: CacheStatus,
    pub pending: IndexMap<String, Vec<Commit>>,
}

pub fn run_status<R: Repository>(
    repo: &R,
    workspace: &Workspace,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<StatusReport> {
    let cache = IncrementalCache::open(config.cache_path(&workspace.root));
    let pending = collect_pending(repo, workspace, config, &cache)?;
    Ok(StatusReport {
        cache: cache.status_at(now),
        pending,
    })
}

/// What `init` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    /// Config file written, `None` if one already existed
    pub config_written: Option<PathBuf>,
    pub cache_path: PathBuf,
    /// Packages whose last commit was recovered from changelog metadata
    pub recovered: usize,
}

/// The `init` workflow: default config, cache directory, cache rebuild
pub fn run_init(workspace: &Workspace, config: &Config, now: DateTime<Utc>) -> Result<InitReport> {
    let config_path = workspace.root.join(CONFIG_FILE_NAME);
    let config_written = if config_path.exists() {
        None
    } else {
        config.save(&config_path)?;
        Some(config_path)
    };

    let cache_path = config.cache_path(&workspace.root);
    let mut cache = IncrementalCache::open(&cache_path);
    let writer = ChangelogWriter::new(&config.changelog_file);
    let recovered = cache.rebuild_at(&workspace.packages, &writer, now)?;

    Ok(InitReport {
        config_written,
        cache_path,
        recovered,
    })
}
