//! Incremental cache of the last commit each package has incorporated.
//!
//! The cache is advisory: a missing or corrupt file is treated as empty,
//! and [IncrementalCache::rebuild] reconstructs it from the metadata block
//! of every changelog.

use crate::boundary::BoundaryWarning;
use crate::changelog::ChangelogWriter;
use crate::domain::PackageSet;
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// How long a cache counts as valid after its last update
pub const CACHE_VALIDITY_DAYS: i64 = 7;

/// On-disk layout of the cache file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheData {
    pub last_commit_hash: String,
    #[serde(with = "crate::domain::timestamp")]
    pub last_update_time: DateTime<Utc>,
    #[serde(default)]
    pub package_commits: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    pub exists: bool,
    pub valid: bool,
    pub last_update_time: Option<DateTime<Utc>>,
    pub package_count: usize,
}

#[derive(Debug, Clone)]
pub struct IncrementalCache {
    path: PathBuf,
    data: Option<CacheData>,
}

impl IncrementalCache {
    /// Load the cache at `path`; any failure yields an empty cache
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<CacheData>(&content) {
                Ok(data) => Some(data),
                Err(e) => {
                    BoundaryWarning::CacheUnreadable {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    }
                    .emit();
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no cache file");
                None
            }
            Err(e) => {
                BoundaryWarning::CacheUnreadable {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
                .emit();
                None
            }
        };

        IncrementalCache { path, data }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> Option<&CacheData> {
        self.data.as_ref()
    }

    /// Hash of the last commit `package` incorporated
    pub fn get_last_commit(&self, package: &str) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.package_commits.get(package))
            .map(String::as_str)
            .filter(|hash| !hash.is_empty())
    }

    /// Newest commit seen by any run
    pub fn global_last_commit(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.last_commit_hash.as_str())
            .filter(|hash| !hash.is_empty())
    }

    /// Merge `commits` into the per-package map, set the global hash to
    /// `head` and persist
    pub fn record_last_commits(&mut self, head: &str, commits: &IndexMap<String, String>) -> Result<()> {
        self.record_last_commits_at(head, commits, Utc::now())
    }

    pub fn record_last_commits_at(
        &mut self,
        head: &str,
        commits: &IndexMap<String, String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut package_commits = self
            .data
            .take()
            .map(|d| d.package_commits)
            .unwrap_or_default();
        for (package, hash) in commits {
            package_commits.insert(package.clone(), hash.clone());
        }

        self.data = Some(CacheData {
            last_commit_hash: head.to_string(),
            last_update_time: now,
            package_commits,
        });
        tracing::debug!(head, packages = commits.len(), "cache updated");
        self.save()
    }

    pub fn status(&self) -> CacheStatus {
        self.status_at(Utc::now())
    }

    /// Status as seen at `now`; valid means updated less than seven days before
    pub fn status_at(&self, now: DateTime<Utc>) -> CacheStatus {
        match &self.data {
            Some(data) => CacheStatus {
                exists: true,
                valid: now.signed_duration_since(data.last_update_time)
                    < Duration::days(CACHE_VALIDITY_DAYS),
                last_update_time: Some(data.last_update_time),
                package_count: data.package_commits.len(),
            },
            None => CacheStatus {
                exists: false,
                valid: false,
                last_update_time: None,
                package_count: 0,
            },
        }
    }

    /// Rebuild from changelog metadata and persist
    ///
    /// Each package with a metadata block contributes its last commit; the
    /// most recently updated block provides the global hash. Returns the
    /// number of packages recovered.
    pub fn rebuild(&mut self, packages: &PackageSet, writer: &ChangelogWriter) -> Result<usize> {
        self.rebuild_at(packages, writer, Utc::now())
    }

    pub fn rebuild_at(
        &mut self,
        packages: &PackageSet,
        writer: &ChangelogWriter,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut package_commits = IndexMap::new();
        let mut newest: Option<(DateTime<Utc>, String)> = None;

        for package in packages.iter() {
            let Some(metadata) = writer.read_metadata(package) else {
                continue;
            };
            if metadata.last_commit_hash.is_empty() {
                continue;
            }
            if newest
                .as_ref()
                .map_or(true, |(time, _)| metadata.last_update_time > *time)
            {
                newest = Some((metadata.last_update_time, metadata.last_commit_hash.clone()));
            }
            package_commits.insert(package.name.clone(), metadata.last_commit_hash);
        }

        let recovered = package_commits.len();
        self.data = Some(CacheData {
            last_commit_hash: newest.map(|(_, hash)| hash).unwrap_or_default(),
            last_update_time: now,
            package_commits,
        });
        tracing::debug!(recovered, "cache rebuilt from changelogs");
        self.save()?;
        Ok(recovered)
    }

    fn save(&self) -> Result<()> {
        let Some(data) = &self.data else {
            return Ok(());
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut content = serde_json::to_string_pretty(data)?;
        content.push('\n');
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn commits(entries: &[(&str, &str)]) -> IndexMap<String, String> {
        entries
            .iter()
            .map(|(p, h)| (p.to_string(), h.to_string()))
            .collect()
    }

    #[test]
    fn test_absent_cache_then_record() {
        let dir = TempDir::new().unwrap();
        let mut cache = IncrementalCache::open(dir.path().join(".changelog/cache.json"));

        let status = cache.status();
        assert!(!status.exists);
        assert!(!status.valid);
        assert_eq!(status.package_count, 0);

        let before = Utc::now();
        cache
            .record_last_commits("head1", &commits(&[("core", "c1")]))
            .unwrap();

        let status = cache.status();
        assert!(status.exists);
        assert!(status.valid);
        assert!(status.last_update_time.unwrap() >= before - Duration::seconds(1));
        assert_eq!(status.package_count, 1);

        let reopened = IncrementalCache::open(cache.path());
        assert_eq!(reopened.get_last_commit("core"), Some("c1"));
        assert_eq!(reopened.global_last_commit(), Some("head1"));
    }

    #[test]
    fn test_record_merges_previous_entries() {
        let dir = TempDir::new().unwrap();
        let mut cache = IncrementalCache::open(dir.path().join("cache.json"));
        cache.record_last_commits("h1", &commits(&[("a", "1"), ("b", "2")])).unwrap();
        cache.record_last_commits("h2", &commits(&[("b", "3")])).unwrap();

        assert_eq!(cache.get_last_commit("a"), Some("1"));
        assert_eq!(cache.get_last_commit("b"), Some("3"));
        assert_eq!(cache.global_last_commit(), Some("h2"));
        assert_eq!(cache.get_last_commit("c"), None);
    }

    #[test]
    fn test_file_layout() {
        let dir = TempDir::new().unwrap();
        let mut cache = IncrementalCache::open(dir.path().join("cache.json"));
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 10, 11, 12).unwrap();
        cache
            .record_last_commits_at("abc", &commits(&[("core", "def")]), now)
            .unwrap();

        let content = fs::read_to_string(cache.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["lastCommitHash"], "abc");
        assert_eq!(json["lastUpdateTime"], "2024-03-09T10:11:12.000Z");
        assert_eq!(json["packageCommits"]["core"], "def");
    }

    #[test]
    fn test_validity_window() {
        let dir = TempDir::new().unwrap();
        let mut cache = IncrementalCache::open(dir.path().join("cache.json"));
        let recorded = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        cache.record_last_commits_at("h", &IndexMap::new(), recorded).unwrap();

        assert!(cache.status_at(recorded + Duration::days(6)).valid);
        let expired = cache.status_at(recorded + Duration::days(7));
        assert!(expired.exists);
        assert!(!expired.valid);
    }

    #[test]
    fn test_rebuild_takes_global_hash_from_newest_metadata() {
        use crate::changelog::{ChangelogMetadata, ChangelogWriter};
        use crate::domain::{Package, PackageSet};

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let package = |name: &str| {
            fs::create_dir_all(root.join(name)).unwrap();
            Package::new(name, "1.0.0", root.join(name), name)
        };
        let packages = PackageSet::new(vec![
            package("a"),
            package("b"),
            package("c"),
            package("corrupt"),
            package("missing"),
        ]);

        // Newest block sits in the middle of the iteration order
        for (name, hash, day) in [("a", "aaa", 2), ("b", "bbb", 9), ("c", "ccc", 1)] {
            let metadata = ChangelogMetadata {
                last_commit_hash: hash.to_string(),
                last_update_time: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
                package_name: name.to_string(),
                package_path: name.to_string(),
            };
            fs::write(
                root.join(name).join("CHANGELOG.md"),
                format!("# Changelog\n\n{}\n\n## [1.0.0]\n", metadata.render().unwrap()),
            )
            .unwrap();
        }
        fs::write(
            root.join("corrupt/CHANGELOG.md"),
            "# Changelog\n\n<!-- changelog-metadata\n{ broken\n-->\n",
        )
        .unwrap();

        let mut cache = IncrementalCache::open(root.join(".changelog/cache.json"));
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let recovered = cache
            .rebuild_at(&packages, &ChangelogWriter::new("CHANGELOG.md"), now)
            .unwrap();

        assert_eq!(recovered, 3);
        assert_eq!(cache.global_last_commit(), Some("bbb"));
        assert_eq!(cache.get_last_commit("a"), Some("aaa"));
        assert_eq!(cache.get_last_commit("b"), Some("bbb"));
        assert_eq!(cache.get_last_commit("c"), Some("ccc"));
        assert_eq!(cache.get_last_commit("corrupt"), None);
        assert_eq!(cache.get_last_commit("missing"), None);

        let reopened = IncrementalCache::open(cache.path());
        assert_eq!(reopened.global_last_commit(), Some("bbb"));
        assert_eq!(reopened.status_at(now).package_count, 3);
    }

    #[test]
    fn test_corrupt_cache_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();

        let cache = IncrementalCache::open(&path);
        assert!(!cache.status().exists);
        assert_eq!(cache.get_last_commit("anything"), None);
    }
}
