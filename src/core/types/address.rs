//! Memory address wrapper type with hex parsing and alignment helpers

use super::error::{MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents a remote-process memory address with type-safe operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub u64);

impl Address {
    /// Creates a new address from a u64 value
    pub const fn new(value: u64) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the address is aligned to the specified boundary
    pub const fn is_aligned(&self, alignment: u64) -> bool {
        alignment != 0 && self.0 % alignment == 0
    }

    /// Aligns the address down to the specified power-of-two boundary
    pub const fn align_down(&self, alignment: u64) -> Self {
        if alignment == 0 {
            return *self;
        }
        Address(self.0 & !(alignment - 1))
    }

    /// Aligns the address up to the specified power-of-two boundary
    pub const fn align_up(&self, alignment: u64) -> Self {
        if alignment == 0 {
            return *self;
        }
        Address((self.0 + alignment - 1) & !(alignment - 1))
    }

    /// Adds a signed offset to the address with wrapping semantics
    pub const fn offset(&self, offset: i64) -> Self {
        Address(self.0.wrapping_add_signed(offset))
    }

    /// Returns the raw u64 value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for Address {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // Handle hex prefix variations
        let value = if s.starts_with("0x") || s.starts_with("0X") {
            u64::from_str_radix(&s[2..], 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            // Assume hex if the string contains letters
            u64::from_str_radix(s, 16)
        } else {
            // Try decimal first, then hex
            s.parse::<u64>().or_else(|_| u64::from_str_radix(s, 16))
        };

        value
            .map(Address::new)
            .map_err(|_| MemoryError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address::new(value)
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Address::new(value as u64)
    }
}
