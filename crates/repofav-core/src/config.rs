use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pagination::DEFAULT_PER_PAGE;

/// Main configuration structure
///
/// Loaded from the config file, then overridden by env vars and CLI args.
/// Priority: CLI > Env > File > Defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from an explicit file. A missing file means defaults.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// `<config dir>/repofav/config.toml`
    pub fn config_path() -> crate::Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| crate::Error::Config("Could not find config directory".into()))?
            .join("repofav")
            .join("config.toml"))
    }

    /// Where the session database and log file live
    pub fn data_dir() -> crate::Result<PathBuf> {
        Ok(dirs::data_local_dir()
            .ok_or_else(|| crate::Error::Config("Could not find data directory".into()))?
            .join("repofav"))
    }

    pub fn db_path(&self) -> crate::Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("state.db")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Base URL of the repositories API, e.g. `http://host/api/Repositories`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds; 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    repofav_api::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginationConfig {
    #[serde(default = "default_per_page")]
    pub search_per_page: u32,
    #[serde(default = "default_per_page")]
    pub favorites_per_page: u32,
    #[serde(default = "default_per_page")]
    pub relevant_per_page: u32,
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            search_per_page: default_per_page(),
            favorites_per_page: default_per_page(),
            relevant_per_page: default_per_page(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// How long confirmation and error notices stay up, in milliseconds
    #[serde(default = "default_notice_ms")]
    pub notice_ms: u64,
}

fn default_notice_ms() -> u64 {
    2000
}

impl UiConfig {
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notice_ms: default_notice_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StorageConfig {
    /// Override for the session database location
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.pagination.search_per_page, 10);
        assert_eq!(config.ui.notice_ms, 2000);
        assert!(config.storage.db_path.is_none());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://repos.example.com/api/Repositories\"\n\n[pagination]\nrelevant_per_page = 25\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "https://repos.example.com/api/Repositories");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.pagination.relevant_per_page, 25);
        assert_eq!(config.pagination.search_per_page, 10);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = 3").unwrap();

        assert!(matches!(Config::load_from(&path), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 0\n\n[ui]\nnotice_ms = 500\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.api.timeout().is_none());
        assert_eq!(loaded.ui.notice_ttl(), std::time::Duration::from_millis(500));
    }
}
