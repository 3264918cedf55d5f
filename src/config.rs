use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    /// Instance configuration handed to each check's `configure`, keyed by
    /// check name.
    pub checks: BTreeMap<String, toml::Table>,
}

impl Config {
    /// Instance table for `check`, empty when the file has none.
    pub fn instance(&self, check: &str) -> toml::Table {
        self.checks.get(check).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub interval_ms: u64,
    pub log_level: String,
    pub format: String,
    pub tags: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            interval_ms: 15_000,
            log_level: "info".to_string(),
            format: "json".to_string(),
            tags: Vec::new(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("cpucheck").join("config.toml"))
}

pub fn load_config_from_path(path: &Path) -> Config {
    read_config(path).unwrap_or_else(|e| {
        log_config_error(&e);
        Config::default()
    })
}

/// Reads the default config file, if any. The failure is handed back rather
/// than logged, for callers that load config before a subscriber exists.
pub fn try_load_config() -> Result<Config, ConfigError> {
    match config_path() {
        Some(path) if path.exists() => read_config(&path),
        _ => Ok(Config::default()),
    }
}

pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn log_config_error(error: &ConfigError) {
    match error {
        ConfigError::Read { path, source } => {
            warn!(path = %path.display(), error = %source, "could not read config, using defaults");
        }
        ConfigError::Parse { path, source } => {
            warn!(path = %path.display(), error = %source, "invalid config, using defaults");
        }
    }
}
