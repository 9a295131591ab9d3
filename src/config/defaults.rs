//! Default configuration values for the scanning core

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub scanner: ScannerDefaults,
    pub snapshots: SnapshotDefaults,
    pub logging: LoggingDefaults,
}

/// Default scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerDefaults {
    pub max_threads: usize,
    pub shard_size: usize,
    pub f32_tolerance: f64,
    pub f64_tolerance: f64,
}

/// Default snapshot-history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDefaults {
    pub retention_ceiling_mib: u64,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
    pub file: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        scanner: ScannerDefaults {
            max_threads: num_cpus::get().min(16),
            shard_size: 1048576, // 1MB
            f32_tolerance: crate::scanning::constraints::DEFAULT_F32_TOLERANCE,
            f64_tolerance: crate::scanning::constraints::DEFAULT_F64_TOLERANCE,
        },
        snapshots: SnapshotDefaults {
            retention_ceiling_mib: 256,
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
            file: "snapshot-scan.log".to_string(),
        },
    }
}
