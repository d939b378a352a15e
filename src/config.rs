//! Application configuration for the CLI shell
//!
//! The engine takes every input explicitly; this config only carries CLI
//! conveniences such as default file locations and the fallback timezone.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default plan JSON file to operate on
    pub plan_path: Option<PathBuf>,

    /// Default completion-rows JSON file
    pub completions_path: Option<PathBuf>,

    /// IANA timezone used when the plan declares none
    pub default_timezone: Option<String>,

    /// Logging setup
    #[serde(default)]
    pub logging: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            plan_path: None,
            completions_path: None,
            default_timezone: None,
            logging: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Default config file location (`~/.config/planrs/config.toml` on Linux)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("planrs")
            .join("config.toml")
    }

    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
