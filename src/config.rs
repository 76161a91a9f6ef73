use crate::error::{ChangelogError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "changelog.config.json";

/// Name of the cache file inside `cache_dir`
pub const CACHE_FILE_NAME: &str = "cache.json";

/// Represents the complete configuration for workspace-changelog.
///
/// Contains the commit type allow-list and the names of the files and
/// directories the tool writes.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_commit_types")]
    pub types: Vec<String>,

    #[serde(default)]
    pub include_all_commits: bool,

    #[serde(default = "default_changelog_file")]
    pub changelog_file: String,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

/// Returns the default list of conventional commit types.
fn default_commit_types() -> Vec<String> {
    [
        "feat", "fix", "perf", "refactor", "docs", "style", "test", "build", "ci", "chore",
        "revert",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

fn default_changelog_file() -> String {
    "CHANGELOG.md".to_string()
}

fn default_cache_dir() -> String {
    ".changelog".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            types: default_commit_types(),
            include_all_commits: false,
            changelog_file: default_changelog_file(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl Config {
    /// Whether a commit with this type tag belongs in changelogs and bumps
    pub fn accepts_type(&self, commit_type: Option<&str>) -> bool {
        if self.include_all_commits {
            return true;
        }
        commit_type.is_some_and(|t| self.types.iter().any(|allowed| allowed == t))
    }

    /// Cache file location for a workspace rooted at `root`
    pub fn cache_path(&self, root: &Path) -> PathBuf {
        root.join(&self.cache_dir).join(CACHE_FILE_NAME)
    }

    /// Writes the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        fs::write(path, content)?;
        Ok(())
    }

    fn validate(self, origin: &Path) -> Result<Self> {
        if self.changelog_file.trim().is_empty() {
            return Err(ChangelogError::config(format!(
                "{}: changelogFile must not be empty",
                origin.display()
            )));
        }
        if self.cache_dir.trim().is_empty() {
            return Err(ChangelogError::config(format!(
                "{}: cacheDir must not be empty",
                origin.display()
            )));
        }
        Ok(self)
    }
}

/// Location of the per-user configuration file
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("workspace-changelog").join("config.json"))
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `changelog.config.json` in current directory
/// 3. `workspace-changelog/config.json` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read, or a field has the wrong type
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let candidate = if let Some(path) = config_path {
        Some(path.to_path_buf())
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        Some(PathBuf::from(CONFIG_FILE_NAME))
    } else {
        user_config_path().filter(|path| path.exists())
    };

    match candidate {
        Some(path) => load_config_file(&path),
        None => Ok(Config::default()),
    }
}

/// Reads one configuration file
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        ChangelogError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    let config: Config = serde_json::from_str(&content)
        .map_err(|e| ChangelogError::config(format!("{}: {}", path.display(), e)))?;
    config.validate(path)
}
