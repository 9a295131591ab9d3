//! Remote-memory read contract consumed by the scanning core

use super::queryer::PointerWidth;
use crate::core::types::{Address, MemoryError, MemoryResult, MemoryValue, ValueType};

/// Reads bytes and typed values out of a target process
///
/// Implementations live in the OS-specific process layer and are bound to
/// one attached process. A failed read surfaces as `Err`; the core treats
/// it as "no data this cycle" and never lets it corrupt existing snapshot
/// state.
pub trait MemoryReader: Send + Sync {
    /// Fills `buffer` from `address`; the whole read succeeds or fails
    fn read_bytes(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()>;

    /// Reads and decodes one value of a fixed-size type
    fn read_value(&self, address: Address, value_type: ValueType) -> MemoryResult<MemoryValue> {
        let size = value_type.size().ok_or_else(|| {
            MemoryError::InvalidValueType(
                "byte-array reads need an explicit length; use read_bytes".to_string(),
            )
        })?;
        let mut buffer = vec![0u8; size];
        self.read_bytes(address, &mut buffer)?;
        MemoryValue::from_bytes(&buffer, value_type).ok_or_else(|| {
            MemoryError::read_failed(address, "value decoding failed")
        })
    }

    /// Reads one pointer at the process's pointer width
    fn read_pointer(&self, address: Address, width: PointerWidth) -> MemoryResult<Address> {
        let mut buffer = [0u8; 8];
        let size = width.size();
        self.read_bytes(address, &mut buffer[..size])?;
        Ok(Address::new(u64::from_le_bytes(buffer)))
    }

    /// Evaluates a pointer chain: dereference, then offset, per level
    ///
    /// Starting from `base`, each step dereferences the current address at
    /// the process's pointer width and adds the level's offset. A null or
    /// unreadable pointer fails with the offending level.
    fn read_pointer_chain(
        &self,
        base: Address,
        offsets: &[i64],
        width: PointerWidth,
    ) -> MemoryResult<Address> {
        let mut address = base;
        for (level, offset) in offsets.iter().enumerate() {
            let pointer = self
                .read_pointer(address, width)
                .map_err(|error| MemoryError::pointer_chain_broken(level, error.to_string()))?;
            if pointer.is_null() {
                return Err(MemoryError::pointer_chain_broken(level, "null pointer"));
            }
            address = pointer.offset(*offset);
        }
        Ok(address)
    }
}
