//! Configuration validator for the scanning core
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError};
use crate::core::VECTOR_WIDTH;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_scanner(&config.scanner)?;
        Self::validate_snapshots(&config.snapshots)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates scanner configuration
    fn validate_scanner(scanner: &super::loader::ScannerConfig) -> Result<(), ConfigError> {
        if scanner.max_threads == 0 {
            return Err(ConfigError::Invalid(
                "Scanner threads must be at least 1".to_string(),
            ));
        }

        if scanner.max_threads > 128 {
            return Err(ConfigError::Invalid(
                "Scanner threads cannot exceed 128".to_string(),
            ));
        }

        // Shard boundaries must never split a vector.
        if scanner.shard_size == 0 || !scanner.shard_size.is_power_of_two() {
            return Err(ConfigError::Invalid(
                "Shard size must be a power of 2".to_string(),
            ));
        }

        if scanner.shard_size < VECTOR_WIDTH {
            return Err(ConfigError::Invalid(format!(
                "Shard size must be at least the vector width ({})",
                VECTOR_WIDTH
            )));
        }

        if scanner.f32_tolerance < 0.0 || scanner.f64_tolerance < 0.0 {
            return Err(ConfigError::Invalid(
                "Float tolerances must be non-negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates snapshot-history configuration
    fn validate_snapshots(snapshots: &super::loader::SnapshotConfig) -> Result<(), ConfigError> {
        if snapshots.retention_ceiling_mib == 0 {
            return Err(ConfigError::Invalid(
                "Retention ceiling must be at least 1 MiB".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &super::loader::LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        if logging.file.is_empty() {
            return Err(ConfigError::Invalid(
                "Log file path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
