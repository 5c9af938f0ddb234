//! Configuration management for Tally.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`, so a missing file or a
//! partial file both produce a usable configuration.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Tally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Full-size receipt image settings
    pub optimize: OptimizeConfig,

    /// Thumbnail generation settings
    pub thumbnail: ThumbnailConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Receipt blob storage settings
    pub storage: StorageConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.tally.tally/config.toml
    /// - Linux: ~/.config/tally/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\tally\tally\config\config.toml
    ///
    /// Falls back to ~/.tally/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "tally", "tally")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".tally").join("config.toml")
            })
    }

    /// Get the resolved receipt storage root (with ~ expansion).
    pub fn storage_root(&self) -> PathBuf {
        let path_str = self.storage.root.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.optimize.max_width, 2048);
        assert_eq!(config.optimize.max_height, 2048);
        assert_eq!(config.optimize.quality, 80);
        assert_eq!(config.thumbnail.max_width, 200);
        assert_eq!(config.thumbnail.quality, 70);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[optimize]"));
        assert!(toml.contains("[thumbnail]"));
        assert!(toml.contains("[storage]"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("[thumbnail]\nenabled = false\n").unwrap();
        assert!(!config.thumbnail.enabled);
        assert_eq!(config.thumbnail.max_height, 200);
        assert_eq!(config.optimize.quality, 80);
    }

    #[test]
    fn test_invalid_toml_value_rejected() {
        let err = Config::from_toml("[optimize]\nquality = 0\n").unwrap_err();
        assert!(err.to_string().contains("optimize.quality"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\ntimeout_ms = 1500\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.limits.timeout_ms, 1500);
    }

    #[test]
    fn test_storage_root_expands_tilde() {
        let mut config = Config::default();
        config.storage.root = PathBuf::from("/var/lib/tally");
        assert_eq!(config.storage_root(), PathBuf::from("/var/lib/tally"));

        config.storage.root = PathBuf::from("~/receipts");
        assert!(!config.storage_root().to_string_lossy().starts_with('~'));
    }
}
