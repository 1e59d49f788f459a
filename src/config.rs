use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const APP_DIR: &str = "hybrid-lab";
pub const DB_ENV: &str = "HLAB_DB";
pub const KEY_DB_PATH: &str = "db_path";
pub const KEY_LOG_LEVEL: &str = "log_level";

/// Flat key/value settings, stored as TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    pub map: BTreeMap<String, String>,
}

impl Config {
    /// Where the config file lives.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join("config"))
            .context("Could not determine config directory")
    }

    /// Missing file means empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        fs::write(path, toml::to_string(self)?)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    /// Database location: `$HLAB_DB`, then the `db_path` key, then the
    /// platform data directory.
    pub fn db_path(&self) -> Result<PathBuf> {
        if let Ok(p) = std::env::var(DB_ENV) {
            if !p.trim().is_empty() {
                return Ok(PathBuf::from(p));
            }
        }
        if let Some(p) = self.map.get(KEY_DB_PATH) {
            return Ok(PathBuf::from(p));
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR).join("hybrid-lab.db"))
            .context("Could not determine data directory")
    }

    pub fn log_level(&self) -> Option<&str> {
        self.map.get(KEY_LOG_LEVEL).map(String::as_str)
    }
}
