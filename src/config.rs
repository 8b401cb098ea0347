//! CLI configuration.
//!
//! Loaded from ~/.config/horas/config.toml:
//!
//! ```toml
//! users = ["alice@example.com", "bob@example.com"]
//! generic_tag = "#GENERICO"
//! lookback_days = 90
//! # data_dir = "/var/lib/horas"
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use horas_core::SyncConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HorasConfig {
    /// Users whose primary calendars get synced.
    #[serde(default)]
    pub users: Vec<String>,

    /// Where the event/task/state files live. Defaults to the platform data
    /// directory.
    pub data_dir: Option<PathBuf>,

    #[serde(flatten)]
    pub sync: SyncConfig,
}

impl HorasConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join("horas")
            .join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(HorasConfig::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_dir()
                .context("Could not determine data directory")?
                .join("horas")),
        }
    }
}
