//! Remote-memory write contract consumed by the scanning core

use crate::core::types::{Address, MemoryResult, MemoryValue};

/// Writes bytes and typed values into a target process
///
/// Implementations must make the target page writable themselves
/// (temporarily relaxing the protection and restoring it afterward) and
/// are expected to log, not fail, partial writes — the returned count
/// reports how many bytes actually landed.
pub trait MemoryWriter: Send + Sync {
    /// Writes `bytes` at `address`, returning the number of bytes written
    fn write_bytes(&self, address: Address, bytes: &[u8]) -> MemoryResult<usize>;

    /// Encodes and writes one value (little-endian byte order)
    fn write_value(&self, address: Address, value: &MemoryValue) -> MemoryResult<usize> {
        self.write_bytes(address, &value.to_bytes())
    }
}
