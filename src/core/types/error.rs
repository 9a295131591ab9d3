//! Custom error types for the scanning core

use std::fmt;
use thiserror::Error;

/// Main error type for snapshot and memory operations
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("Failed to read memory at {address}: {reason}")]
    ReadFailed { address: String, reason: String },

    #[error("Failed to write memory at {address}: {reason}")]
    WriteFailed { address: String, reason: String },

    #[error("Invalid value type: {0}")]
    InvalidValueType(String),

    #[error("Invalid pattern format: {0}")]
    InvalidPattern(String),

    #[error("Invalid scan constraint: {0}")]
    InvalidConstraint(String),

    #[error("Unsupported constraint for compilation: {0}")]
    UnsupportedConstraint(String),

    #[error("Previous values unavailable for region at {address}")]
    PreviousValuesUnavailable { address: String },

    #[error("Current values unavailable for region at {address}")]
    CurrentValuesUnavailable { address: String },

    #[error("Pointer chain broken at level {level}: {reason}")]
    PointerChainBroken { level: usize, reason: String },

    #[error("Buffer too small: expected {expected}, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Region query failed: {0}")]
    QueryFailed(String),

    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    /// Creates a read failed error
    pub fn read_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::ReadFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a write failed error
    pub fn write_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::WriteFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a pointer chain broken error
    pub fn pointer_chain_broken(level: usize, reason: impl Into<String>) -> Self {
        MemoryError::PointerChainBroken {
            level,
            reason: reason.into(),
        }
    }

    /// Creates a buffer too small error
    pub fn buffer_too_small(expected: usize, actual: usize) -> Self {
        MemoryError::BufferTooSmall { expected, actual }
    }

    /// Creates a previous-values-unavailable error for a region base address
    pub fn previous_values_unavailable(address: impl fmt::Display) -> Self {
        MemoryError::PreviousValuesUnavailable {
            address: address.to_string(),
        }
    }

    /// Creates a current-values-unavailable error for a region base address
    pub fn current_values_unavailable(address: impl fmt::Display) -> Self {
        MemoryError::CurrentValuesUnavailable {
            address: address.to_string(),
        }
    }
}
