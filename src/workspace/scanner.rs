use crate::boundary::BoundaryWarning;
use crate::domain::{Package, PackageSet};
use crate::error::{ChangelogError, Result};
use crate::workspace::manifest::{read_manifest_file, read_package, MANIFEST_FILE};
use indexmap::IndexSet;
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const PNPM_WORKSPACE_FILE: &str = "pnpm-workspace.yaml";

#[derive(Debug, Deserialize)]
struct PnpmWorkspace {
    #[serde(default)]
    packages: Vec<String>,
}

/// A workspace root and the members found under it
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub patterns: Vec<String>,
    pub packages: PackageSet,
}

impl Workspace {
    /// Re-read every member manifest
    pub fn reload(&mut self) -> Result<()> {
        self.packages = PackageSet::new(scan_members(&self.root, &self.patterns)?);
        Ok(())
    }
}

/// Find the workspace containing `start_dir` and read its members
pub fn discover_workspace(start_dir: &Path) -> Result<Workspace> {
    let start = start_dir.canonicalize().map_err(|e| {
        ChangelogError::environment(format!("cannot access {}: {}", start_dir.display(), e))
    })?;

    let (root, patterns) = find_workspace_root(&start)?.ok_or_else(|| {
        ChangelogError::environment(format!(
            "no workspace root found above '{}' (expected {} or a {} with \"workspaces\")",
            start.display(),
            PNPM_WORKSPACE_FILE,
            MANIFEST_FILE
        ))
    })?;

    tracing::debug!(root = %root.display(), ?patterns, "workspace root found");
    let packages = PackageSet::new(scan_members(&root, &patterns)?);

    Ok(Workspace {
        root,
        patterns,
        packages,
    })
}

/// Walk upward from `start` to the first directory declaring workspace members
pub fn find_workspace_root(start: &Path) -> Result<Option<(PathBuf, Vec<String>)>> {
    for dir in start.ancestors() {
        if let Some(patterns) = member_patterns(dir)? {
            return Ok(Some((dir.to_path_buf(), patterns)));
        }
    }
    Ok(None)
}

fn member_patterns(dir: &Path) -> Result<Option<Vec<String>>> {
    let pnpm_file = dir.join(PNPM_WORKSPACE_FILE);
    if pnpm_file.is_file() {
        let content = fs::read_to_string(&pnpm_file)?;
        let workspace: PnpmWorkspace = serde_yml::from_str(&content).map_err(|e| {
            ChangelogError::environment(format!("{}: {}", pnpm_file.display(), e))
        })?;
        return Ok(Some(workspace.packages));
    }

    let manifest = dir.join(MANIFEST_FILE);
    if manifest.is_file() {
        // A member manifest on the way up is not an error
        if let Ok(parsed) = read_manifest_file(&manifest) {
            if let Some(workspaces) = parsed.workspaces {
                return Ok(Some(workspaces.patterns().to_vec()));
            }
        }
    }

    Ok(None)
}

/// Resolve member patterns under `root` and read each member manifest
///
/// Patterns starting with `!` exclude directories matched by the rest of
/// the pattern. Unreadable or unnamed manifests are skipped with a warning.
pub fn scan_members(root: &Path, patterns: &[String]) -> Result<Vec<Package>> {
    let mut includes = Vec::new();
    let mut excludes = Vec::new();

    for pattern in patterns {
        let pattern = pattern.trim();
        if let Some(negated) = pattern.strip_prefix('!') {
            excludes.push(compile_pattern(root, negated)?);
        } else if !pattern.is_empty() {
            includes.push(pattern);
        }
    }

    let mut directories = IndexSet::new();
    for pattern in includes {
        let full = root.join(pattern.trim_end_matches('/'));
        let entries = glob::glob(&full.to_string_lossy()).map_err(|e| {
            ChangelogError::config(format!("invalid workspace pattern '{}': {}", pattern, e))
        })?;

        let before = directories.len();
        for entry in entries {
            match entry {
                Ok(path) => {
                    let path = normalize(&path);
                    if path.is_dir()
                        && path.join(MANIFEST_FILE).is_file()
                        && !in_node_modules(root, &path)
                        && !excludes.iter().any(|p| p.matches_path(&path))
                    {
                        directories.insert(path);
                    }
                }
                Err(e) => tracing::debug!(error = %e, "skipping unreadable path"),
            }
        }
        if directories.len() == before {
            tracing::debug!(pattern, "workspace pattern matched no members");
        }
    }

    let mut packages = Vec::new();
    for dir in directories {
        let relative = relative_path(root, &dir);
        match read_package(&dir, &relative) {
            Ok(package) => packages.push(package),
            Err(e) => BoundaryWarning::ManifestUnreadable {
                path: dir.join(MANIFEST_FILE).display().to_string(),
                reason: e.to_string(),
            }
            .emit(),
        }
    }

    Ok(packages)
}

fn compile_pattern(root: &Path, pattern: &str) -> Result<glob::Pattern> {
    let full = root.join(pattern.trim_end_matches('/'));
    glob::Pattern::new(&full.to_string_lossy()).map_err(|e| {
        ChangelogError::config(format!("invalid workspace pattern '!{}': {}", pattern, e))
    })
}

/// Drop `.` components so `root/./pkg` compares equal to `root/pkg`
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn in_node_modules(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .map(|rel| rel.components().any(|c| c.as_os_str() == "node_modules"))
        .unwrap_or(false)
}

/// `/`-separated path of `dir` below `root`, empty for the root itself
pub fn relative_path(root: &Path, dir: &Path) -> String {
    dir.strip_prefix(root)
        .map(|rel| {
            rel.components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}
