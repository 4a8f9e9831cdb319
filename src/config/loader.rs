use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::BrowserConfig;

/// Deepest catalog walk accepted from configuration.
pub const MAX_CATALOG_DEPTH: usize = 4;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl BrowserConfig {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/record-browser/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("record-browser").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// A missing file yields `BrowserConfig::default()`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(BrowserConfig::default());
        }
        Self::load_from(&path)
    }

    /// Loads and validates configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: BrowserConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - page size is non-zero
    /// - catalog depth does not exceed `MAX_CATALOG_DEPTH`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.page_size == 0 {
            return Err(ConfigError::ValidationError {
                message: "Page size must be at least 1".to_string(),
            });
        }

        if self.defaults.catalog_depth > MAX_CATALOG_DEPTH {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Catalog depth {} exceeds the maximum of {}",
                    self.defaults.catalog_depth, MAX_CATALOG_DEPTH
                ),
            });
        }

        Ok(())
    }
}
