use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "release-pr.toml";

/// Represents the complete configuration for release-pr.
///
/// Every key is optional in the file; missing keys take the defaults below.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Prefix of release commit messages and PR titles
    #[serde(default = "default_commit_prefix")]
    pub commit_prefix: String,

    /// Technical branch holding the single release commit
    #[serde(default = "default_pr_branch")]
    pub pr_branch: String,

    /// Branch releases are cut from; the repository default branch if unset
    #[serde(default)]
    pub target_branch: Option<String>,

    /// Shell command run with `VERSION` set before the changelog is written
    #[serde(default)]
    pub version_cmd: Option<String>,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How long a run waits for a concurrent run to finish
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub delete_branch_after_release: bool,

    #[serde(default)]
    pub changelog: ChangelogConfig,
}

fn default_commit_prefix() -> String {
    "chore: release".to_string()
}

fn default_pr_branch() -> String {
    "release-pr".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_lock_timeout_secs() -> u64 {
    600
}

fn default_true() -> bool {
    true
}

fn default_changelog_path() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

fn default_git_cliff_bin() -> String {
    "git-cliff".to_string()
}

/// Configuration for the changelog file and the generator producing it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    /// Changelog file, relative to the repository root
    #[serde(default = "default_changelog_path")]
    pub path: PathBuf,

    #[serde(default = "default_git_cliff_bin")]
    pub git_cliff_bin: String,

    /// Explicit git-cliff configuration file
    #[serde(default)]
    pub config: Option<PathBuf>,

    /// Treat CRLF and LF as equal when checking for release races
    #[serde(default)]
    pub normalize_line_endings: bool,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            path: default_changelog_path(),
            git_cliff_bin: default_git_cliff_bin(),
            config: None,
            normalize_line_endings: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            commit_prefix: default_commit_prefix(),
            pr_branch: default_pr_branch(),
            target_branch: None,
            version_cmd: None,
            remote: default_remote(),
            log_level: default_log_level(),
            lock_timeout_secs: default_lock_timeout_secs(),
            delete_branch_after_release: true,
            changelog: ChangelogConfig::default(),
        }
    }
}

/// Values that take precedence over the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub commit_prefix: Option<String>,
    pub pr_branch: Option<String>,
    pub target_branch: Option<String>,
    pub version_cmd: Option<String>,
}

impl Overrides {
    /// GitHub Action inputs (`INPUT_*`) read through `lookup`; empty values
    /// count as unset.
    pub fn from_inputs<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Overrides {
            commit_prefix: input("INPUT_COMMIT_PREFIX"),
            pr_branch: input("INPUT_PR_BRANCH"),
            target_branch: input("INPUT_TARGET_BRANCH"),
            version_cmd: input("INPUT_VERSION_CMD"),
        }
    }

    /// Action inputs from the process environment
    pub fn from_env() -> Self {
        Self::from_inputs(|name| std::env::var(name).ok())
    }
}

impl Config {
    /// Apply `overrides` on top of the loaded values
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(prefix) = overrides.commit_prefix {
            self.commit_prefix = prefix;
        }
        if let Some(branch) = overrides.pr_branch {
            self.pr_branch = branch;
        }
        if let Some(branch) = overrides.target_branch {
            self.target_branch = Some(branch);
        }
        if let Some(cmd) = overrides.version_cmd {
            self.version_cmd = Some(cmd);
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release-pr.toml` in current directory
/// 3. `release-pr.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);

    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if local.exists() {
        fs::read_to_string(local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
