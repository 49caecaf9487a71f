//! # Application Configuration
//!
//! Settings live in a single YAML file `config.yaml` at the root of the data
//! directory. A missing file means defaults: local-only mode.
//!
//! ```text
//! <data dir>/
//! ├── config.yaml      ← this module
//! ├── profile.json
//! ├── logs.json
//! └── device_id.json
//! ```
//!
//! ## YAML Format
//!
//! ```yaml
//! remote:
//!   url: "https://example.supabase.co"
//!   api_key: "public-anon-key"
//!   timeout_secs: 10
//! ```
//!
//! Environment variables override the file: `HEALTHNOTE_REMOTE_URL`,
//! `HEALTHNOTE_REMOTE_KEY` and `HEALTHNOTE_REMOTE_TIMEOUT_SECS`. The data
//! directory itself comes from `HEALTHNOTE_DATA_DIR` or the platform data
//! directory.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::io::remote::DEFAULT_REMOTE_TIMEOUT;

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const DATA_DIR_ENV: &str = "HEALTHNOTE_DATA_DIR";
pub const REMOTE_URL_ENV: &str = "HEALTHNOTE_REMOTE_URL";
pub const REMOTE_KEY_ENV: &str = "HEALTHNOTE_REMOTE_KEY";
pub const REMOTE_TIMEOUT_ENV: &str = "HEALTHNOTE_REMOTE_TIMEOUT_SECS";
const APP_DIR_NAME: &str = "HealthNote";

/// Connection settings for the optional remote backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RemoteConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl RemoteConfig {
    /// Both URL and key are required before any remote call is made
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.url) && present(&self.api_key)
    }

    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub remote: RemoteConfig,
}

impl AppConfig {
    /// Read `config.yaml` from the data directory, defaults when absent
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let yaml_content = fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: AppConfig =
            serde_yaml::from_str(&yaml_content).with_context(|| format!("Invalid config file {:?}", path))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load from disk and apply the process environment
    pub fn load_with_env(data_dir: &Path) -> Result<Self> {
        let mut config = Self::load(data_dir)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlay values from an environment lookup; empty values are ignored
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(REMOTE_URL_ENV) {
            self.remote.url = Some(url);
        }
        if let Some(key) = non_empty(REMOTE_KEY_ENV) {
            self.remote.api_key = Some(key);
        }
        if let Some(raw) = non_empty(REMOTE_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.remote.timeout_secs = Some(secs),
                Err(_) => warn!("Ignoring {}={:?}: not a number of seconds", REMOTE_TIMEOUT_ENV, raw),
            }
        }
    }
}

/// Where the journal keeps its files
pub fn resolve_data_directory() -> Result<PathBuf> {
    resolve_data_directory_from(|key| std::env::var(key).ok())
}

pub fn resolve_data_directory_from<F>(lookup: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    dirs::data_dir()
        .or_else(dirs::home_dir)
        .map(|base| base.join(APP_DIR_NAME))
        .context("Could not determine a data directory; set HEALTHNOTE_DATA_DIR")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_gives_local_only_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load(temp_dir.path()).unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(!config.remote.is_configured());
        assert_eq!(config.remote.timeout(), DEFAULT_REMOTE_TIMEOUT);
    }

    #[test]
    fn test_load_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "remote:\n  url: \"https://db.example.com\"\n  api_key: \"anon\"\n  timeout_secs: 3\n",
        )
        .unwrap();

        let config = AppConfig::load(temp_dir.path()).unwrap();

        assert!(config.remote.is_configured());
        assert_eq!(config.remote.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "remote: [unclosed").unwrap();

        assert!(AppConfig::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.remote.api_key = Some("from-file".to_string());

        config.apply_env_overrides(env(&[
            (REMOTE_URL_ENV, "https://env.example.com"),
            (REMOTE_KEY_ENV, "  "),
            (REMOTE_TIMEOUT_ENV, "soon"),
        ]));

        assert_eq!(config.remote.url.as_deref(), Some("https://env.example.com"));
        assert_eq!(config.remote.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.remote.timeout_secs, None);
        assert!(config.remote.is_configured());
    }

    #[test]
    fn test_url_alone_is_not_configured() {
        let remote = RemoteConfig {
            url: Some("https://db.example.com".to_string()),
            ..Default::default()
        };
        assert!(!remote.is_configured());
    }

    #[test]
    fn test_data_directory_env_wins() {
        let dir = resolve_data_directory_from(env(&[(DATA_DIR_ENV, "/tmp/healthnote-data")])).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/healthnote-data"));
    }
}
