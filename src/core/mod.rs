//! Core module containing fundamental types for the scanning engine
//!
//! This module provides the foundational building blocks used throughout
//! the crate: address handling, scannable value types, byte patterns,
//! and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{Address, BytePattern, MemoryError, MemoryResult, MemoryValue, ValueType};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

/// Width in bytes of the vector unit all chunked scanners operate on
///
/// Read-group shards are rounded to a multiple of this width so no shard
/// boundary ever falls mid-vector.
pub const VECTOR_WIDTH: usize = 16;
