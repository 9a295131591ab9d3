//! Configuration loader for the scanning core
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_scanner")]
    pub scanner: ScannerConfig,

    #[serde(default = "default_snapshots")]
    pub snapshots: SnapshotConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,
    #[serde(default = "default_shard_size")]
    pub shard_size: usize,
    #[serde(default = "default_f32_tolerance")]
    pub f32_tolerance: f64,
    #[serde(default = "default_f64_tolerance")]
    pub f64_tolerance: f64,
}

/// Snapshot-history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_retention_ceiling_mib")]
    pub retention_ceiling_mib: u64,
}

impl SnapshotConfig {
    /// The retention ceiling in bytes
    pub fn retention_ceiling_bytes(&self) -> u64 {
        self.retention_ceiling_mib * 1024 * 1024
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: String,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration or returns defaults if file doesn't exist
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_default()
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from the default location
pub fn load_config() -> Result<Config, ConfigError> {
    let loader = ConfigLoader::new("config.toml");
    Ok(loader.load_or_default())
}

// Default functions for serde
fn default_scanner() -> ScannerConfig {
    let defaults = default_config();
    ScannerConfig {
        max_threads: defaults.scanner.max_threads,
        shard_size: defaults.scanner.shard_size,
        f32_tolerance: defaults.scanner.f32_tolerance,
        f64_tolerance: defaults.scanner.f64_tolerance,
    }
}

fn default_snapshots() -> SnapshotConfig {
    SnapshotConfig {
        retention_ceiling_mib: default_config().snapshots.retention_ceiling_mib,
    }
}

fn default_logging() -> LoggingConfig {
    let defaults = default_config();
    LoggingConfig {
        level: defaults.logging.level,
        file: defaults.logging.file,
    }
}

fn default_max_threads() -> usize {
    default_config().scanner.max_threads
}

fn default_shard_size() -> usize {
    default_config().scanner.shard_size
}

fn default_f32_tolerance() -> f64 {
    default_config().scanner.f32_tolerance
}

fn default_f64_tolerance() -> f64 {
    default_config().scanner.f64_tolerance
}

fn default_retention_ceiling_mib() -> u64 {
    default_config().snapshots.retention_ceiling_mib
}

fn default_log_level() -> String {
    default_config().logging.level
}

fn default_log_file() -> String {
    default_config().logging.file
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scanner: default_scanner(),
            snapshots: default_snapshots(),
            logging: default_logging(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.scanner.max_threads > 0);
        assert_eq!(config.snapshots.retention_ceiling_mib, 256);
        assert_eq!(
            config.snapshots.retention_ceiling_bytes(),
            256 * 1024 * 1024
        );
    }

    #[test]
    fn test_load_missing_file() {
        let loader = ConfigLoader::new("nonexistent.toml");
        let result = loader.load();
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_or_default() {
        let loader = ConfigLoader::new("nonexistent.toml");
        let config = loader.load_or_default();
        assert_eq!(config.scanner.shard_size, 1048576);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let config = Config::default();
        let loader = ConfigLoader::new(&config_path);

        loader.save(&config).unwrap();
        assert!(config_path.exists());

        let loaded = loader.load().unwrap();
        assert_eq!(loaded.scanner.shard_size, config.scanner.shard_size);
        assert_eq!(
            loaded.snapshots.retention_ceiling_mib,
            config.snapshots.retention_ceiling_mib
        );
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
            [scanner]
            shard_size = 65536
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.scanner.shard_size, 65536);
        // Check defaults are applied
        assert!(config.scanner.max_threads > 0);
        assert_eq!(config.snapshots.retention_ceiling_mib, 256);
        assert_eq!(config.logging.level, "info");
    }
}
