use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::github::client::DEFAULT_BASE_URL as DEFAULT_GITHUB_API_URL;
use crate::github::types::RepositoryRef;
use crate::version::wordpress::DEFAULT_BASE_URL as DEFAULT_WORDPRESS_API_URL;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default sweep interval in milliseconds (24 hours)
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;

/// Timeout for network operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Delay between starting each repository check to avoid rate limiting (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

// =============================================================================
// Identity
// =============================================================================

/// Login of the bot account that files notifications
pub const DEFAULT_BOT_LOGIN: &str = "wordpress-version-checker[bot]";

/// User agent sent with every HTTP request
pub const USER_AGENT: &str = "wordpress-version-checker";

const APP_NAME: &str = "wordpress-version-checker";

/// Environment variable consulted when no GitHub token is configured
const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Repository entry {index} is missing its {field}")]
    InvalidRepository { index: usize, field: &'static str },

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Checker configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckerConfig {
    /// Monitored repositories, never mutated at runtime
    pub repositories: Vec<RepositoryRef>,
    pub github: GitHubConfig,
    pub wordpress: WordPressConfig,
    pub schedule: ScheduleConfig,
    /// Network timeout in milliseconds
    pub fetch_timeout: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            repositories: Vec::new(),
            github: GitHubConfig::default(),
            wordpress: WordPressConfig::default(),
            schedule: ScheduleConfig::default(),
            fetch_timeout: FETCH_TIMEOUT_MS,
        }
    }
}

/// GitHub API configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitHubConfig {
    pub api_url: String,
    /// Author login that marks an issue as one of ours
    pub bot_login: String,
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            bot_login: DEFAULT_BOT_LOGIN.to_string(),
            token: None,
        }
    }
}

/// WordPress.org API configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WordPressConfig {
    pub api_url: String,
}

impl Default for WordPressConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_WORDPRESS_API_URL.to_string(),
        }
    }
}

/// Sweep schedule configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleConfig {
    /// Sweep interval in milliseconds
    pub interval: u64,
    /// Run the first sweep at startup instead of after one interval
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SWEEP_INTERVAL_MS,
            run_on_start: true,
        }
    }
}

impl CheckerConfig {
    /// Load the configuration from a JSON file and fill in the token from the environment
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.github.token.is_none() {
            config.github.token = std::env::var(GITHUB_TOKEN_ENV)
                .ok()
                .filter(|token| !token.is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, repository) in self.repositories.iter().enumerate() {
            let missing = [
                ("owner", &repository.owner),
                ("repo", &repository.repo),
                ("path", &repository.path),
            ]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());

            if let Some((field, _)) = missing {
                return Err(ConfigError::InvalidRepository { index, field });
            }
        }

        if self.schedule.interval == 0 {
            return Err(ConfigError::ZeroDuration("schedule.interval"));
        }
        if self.fetch_timeout == 0 {
            return Err(ConfigError::ZeroDuration("fetchTimeout"));
        }

        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.schedule.interval)
    }
}

/// Returns the path to the default config file.
/// Uses $XDG_CONFIG_HOME/wordpress-version-checker if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/wordpress-version-checker,
/// or ./wordpress-version-checker if neither is available.
pub fn config_path() -> PathBuf {
    app_dir_with_env(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
    .join("config.json")
}

/// Returns the path to the data directory for wordpress-version-checker.
/// Uses $XDG_DATA_HOME/wordpress-version-checker if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/wordpress-version-checker,
/// or ./wordpress-version-checker if neither is available.
pub fn data_dir() -> PathBuf {
    app_dir_with_env(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("wordpress-version-checker.log")
}

fn app_dir_with_env(
    xdg_home: Option<String>,
    home_dir: Option<PathBuf>,
    home_relative: &str,
) -> PathBuf {
    let base = xdg_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(home_relative)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_NAME)
}
