// tests/workflow_test.rs
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use workspace_changelog::analyzer::TargetSelection;
use workspace_changelog::cache::IncrementalCache;
use workspace_changelog::cli::{run_init, run_status, run_update_workflow, UpdateArgs};
use workspace_changelog::config::Config;
use workspace_changelog::domain::{BumpType, Commit, UpdateReason};
use workspace_changelog::git::MockRepository;
use workspace_changelog::workspace::{discover_workspace, JsonManifestStore};
use workspace_changelog::ChangelogError;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// `app` depends on `core` with `^1.0.0`; `docs` stands alone
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        &root.join("package.json"),
        r#"{ "name": "monorepo", "private": true, "workspaces": ["packages/*"] }"#,
    );
    write(
        &root.join("packages/core/package.json"),
        "{\n  \"name\": \"core\",\n  \"version\": \"1.0.0\"\n}\n",
    );
    write(
        &root.join("packages/app/package.json"),
        "{\n  \"name\": \"app\",\n  \"version\": \"1.0.0\",\n  \"dependencies\": {\n    \"core\": \"^1.0.0\",\n    \"left-pad\": \"^1.3.0\"\n  }\n}\n",
    );
    write(
        &root.join("packages/docs/package.json"),
        "{\n  \"name\": \"docs\",\n  \"version\": \"0.3.0\"\n}\n",
    );
    dir
}

fn commit(hash: &str, message: &str, minute: u32, files: &[&str]) -> Commit {
    Commit::new(
        hash,
        message,
        "dev",
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        files.iter().map(|f| f.to_string()).collect(),
    )
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn update(selection: TargetSelection, force: bool) -> UpdateArgs {
    UpdateArgs {
        selection,
        bump: None,
        dry_run: false,
        force,
    }
}

#[test]
fn test_fix_in_dependency_propagates_patch() {
    let dir = setup_workspace();
    let root = dir.path();
    let repo = MockRepository::new().with_commit(commit(
        "c1",
        "fix(core): handle empty input",
        0,
        &["packages/core/src/index.ts"],
    ));
    let mut workspace = discover_workspace(root).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();

    let result = run_update_workflow(
        &repo,
        &mut workspace,
        &Config::default(),
        JsonManifestStore,
        &update(TargetSelection::Named(vec!["core".to_string()]), false),
        now,
    )
    .unwrap();

    let core = result.plan.get("core").unwrap();
    assert_eq!(core.bump, BumpType::Patch);
    assert_eq!(core.reason, UpdateReason::Direct);
    let app = result.plan.get("app").unwrap();
    assert_eq!(app.reason, UpdateReason::Dependency);
    assert!(result.plan.get("docs").is_none());

    let core_manifest = read_json(&root.join("packages/core/package.json"));
    assert_eq!(core_manifest["version"], "1.0.1");
    let app_manifest = read_json(&root.join("packages/app/package.json"));
    assert_eq!(app_manifest["version"], "1.0.1");
    assert_eq!(app_manifest["dependencies"]["core"], "1.0.1");
    assert_eq!(app_manifest["dependencies"]["left-pad"], "^1.3.0");
    assert_eq!(
        read_json(&root.join("packages/docs/package.json"))["version"],
        "0.3.0"
    );

    let core_log = fs::read_to_string(root.join("packages/core/CHANGELOG.md")).unwrap();
    assert!(core_log.contains("## [1.0.1] - 2024-05-02"));
    assert!(core_log.contains("handle empty input"));
    let app_log = fs::read_to_string(root.join("packages/app/CHANGELOG.md")).unwrap();
    assert!(app_log.contains("## [1.0.1] - 2024-05-02"));
    assert!(app_log.contains("core"));
    assert_eq!(result.changelogs.len(), 2);

    let cache = IncrementalCache::open(Config::default().cache_path(&workspace.root));
    assert_eq!(cache.get_last_commit("core"), Some("c1"));
    assert_eq!(cache.get_last_commit("app"), Some("c1"));
    assert_eq!(cache.global_last_commit(), Some("c1"));
}

#[test]
fn test_second_run_without_new_commits_is_empty() {
    let dir = setup_workspace();
    let repo = MockRepository::new().with_commit(commit(
        "c1",
        "feat: add parser",
        0,
        &["packages/core/index.ts"],
    ));
    let config = Config::default();
    let mut workspace = discover_workspace(dir.path()).unwrap();

    let first = run_update_workflow(
        &repo,
        &mut workspace,
        &config,
        JsonManifestStore,
        &update(TargetSelection::All, false),
        Utc::now(),
    )
    .unwrap();
    assert_eq!(first.plan.get("core").unwrap().bump, BumpType::Minor);

    workspace.reload().unwrap();
    assert_eq!(workspace.packages.get("core").unwrap().version, "1.1.0");

    let second = run_update_workflow(
        &repo,
        &mut workspace,
        &config,
        JsonManifestStore,
        &update(TargetSelection::All, false),
        Utc::now(),
    )
    .unwrap();
    assert!(second.is_empty());
    assert_eq!(workspace.packages.get("core").unwrap().version, "1.1.0");
}

#[test]
fn test_breaking_change_conflict_aborts_without_writes() {
    let dir = setup_workspace();
    let root = dir.path();
    let repo = MockRepository::new().with_commit(commit(
        "c1",
        "feat(core)!: drop legacy api",
        0,
        &["packages/core/index.ts"],
    ));
    let mut workspace = discover_workspace(root).unwrap();
    let before = fs::read_to_string(root.join("packages/app/package.json")).unwrap();

    let err = run_update_workflow(
        &repo,
        &mut workspace,
        &Config::default(),
        JsonManifestStore,
        &update(TargetSelection::Named(vec!["core".to_string()]), false),
        Utc::now(),
    )
    .unwrap_err();

    match err {
        ChangelogError::Conflicts(conflicts) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].dependent, "app");
            assert_eq!(conflicts[0].dependency, "core");
            assert_eq!(conflicts[0].required_range, "^1.0.0");
            assert_eq!(conflicts[0].candidate_version.to_string(), "2.0.0");
        }
        other => panic!("expected conflicts, got {:?}", other),
    }

    assert_eq!(
        read_json(&root.join("packages/core/package.json"))["version"],
        "1.0.0"
    );
    assert_eq!(
        fs::read_to_string(root.join("packages/app/package.json")).unwrap(),
        before
    );
    assert!(!root.join("packages/core/CHANGELOG.md").exists());
    assert!(!Config::default().cache_path(&workspace.root).exists());
}

#[test]
fn test_force_applies_despite_conflicts() {
    let dir = setup_workspace();
    let root = dir.path();
    let repo = MockRepository::new().with_commit(commit(
        "c1",
        "feat(core)!: drop legacy api",
        0,
        &["packages/core/index.ts"],
    ));
    let mut workspace = discover_workspace(root).unwrap();

    let result = run_update_workflow(
        &repo,
        &mut workspace,
        &Config::default(),
        JsonManifestStore,
        &update(TargetSelection::Named(vec!["core".to_string()]), true),
        Utc::now(),
    )
    .unwrap();

    assert_eq!(result.conflicts.len(), 1);
    let app_manifest = read_json(&root.join("packages/app/package.json"));
    assert_eq!(app_manifest["dependencies"]["core"], "2.0.0");
    let core_log = fs::read_to_string(root.join("packages/core/CHANGELOG.md")).unwrap();
    assert!(core_log.contains("BREAKING CHANGES"));
}

#[test]
fn test_explicit_bump_applies_to_every_planned_package() {
    let dir = setup_workspace();
    let repo = MockRepository::new().with_commit(commit(
        "c1",
        "fix: small thing",
        0,
        &["packages/core/index.ts"],
    ));
    let mut workspace = discover_workspace(dir.path()).unwrap();
    let args = UpdateArgs {
        selection: TargetSelection::Named(vec!["core".to_string()]),
        bump: Some(BumpType::Minor),
        dry_run: true,
        force: false,
    };

    let result = run_update_workflow(
        &repo,
        &mut workspace,
        &Config::default(),
        JsonManifestStore,
        &args,
        Utc::now(),
    )
    .unwrap();

    assert!(result.plan.strategies().all(|s| s.bump == BumpType::Minor));
    assert!(result
        .changes
        .iter()
        .all(|c| c.new_version.minor == c.old_version.minor + 1));
    assert_eq!(
        read_json(&dir.path().join("packages/core/package.json"))["version"],
        "1.0.0"
    );
}

#[test]
fn test_status_reports_pending_per_package() {
    let dir = setup_workspace();
    let repo = MockRepository::new()
        .with_commit(commit("c1", "fix: core bug", 0, &["packages/core/a.ts"]))
        .with_commit(commit("c2", "docs: typo", 1, &["packages/docs/README.md"]))
        .with_commit(commit("c3", "wip: scratch", 2, &["packages/docs/notes.md"]));
    let workspace = discover_workspace(dir.path()).unwrap();

    let report = run_status(&repo, &workspace, &Config::default(), Utc::now()).unwrap();
    assert!(!report.cache.exists);
    assert_eq!(report.pending["core"].len(), 1);
    assert_eq!(report.pending["docs"].len(), 1);
    assert!(report.pending["app"].is_empty());
}

#[test]
fn test_init_writes_config_and_recovers_cache() {
    let dir = setup_workspace();
    let root = dir.path();
    write(
        &root.join("packages/core/CHANGELOG.md"),
        "# Changelog\n\n<!-- changelog-metadata\n{\"lastCommitHash\":\"abc123\",\"lastUpdateTime\":\"2024-05-01T08:30:00Z\",\"packageName\":\"core\",\"packagePath\":\"packages/core\"}\n-->\n\n## [1.0.0] - 2024-05-01\n\n### Features\n\n- initial release\n",
    );
    let workspace = discover_workspace(root).unwrap();

    let report = run_init(&workspace, &Config::default(), Utc::now()).unwrap();
    assert_eq!(report.recovered, 1);
    assert!(report.config_written.is_some());
    assert!(workspace.root.join("changelog.config.json").exists());

    let cache = IncrementalCache::open(&report.cache_path);
    assert_eq!(cache.get_last_commit("core"), Some("abc123"));
    assert_eq!(cache.get_last_commit("app"), None);

    let again = run_init(&workspace, &Config::default(), Utc::now()).unwrap();
    assert!(again.config_written.is_none());
}
