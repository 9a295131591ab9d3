//! Byte patterns with wildcard masks for array-of-bytes scans

use super::error::{MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A byte pattern paired with a per-byte significance mask
///
/// Mask bytes are `0xFF` for significant positions and `0x00` for
/// wildcards; pattern bytes under a wildcard are normalized to zero so
/// equality on the struct is equality of the match semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BytePattern {
    bytes: Vec<u8>,
    mask: Vec<u8>,
}

impl BytePattern {
    /// Creates a pattern from raw bytes with every position significant
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mask = vec![0xFF; bytes.len()];
        BytePattern { bytes, mask }
    }

    /// Creates a pattern from bytes and a parallel significance mask
    ///
    /// Mask bytes are applied as given; pattern bytes at masked-out
    /// positions are zeroed.
    pub fn with_mask(bytes: Vec<u8>, mask: Vec<u8>) -> MemoryResult<Self> {
        if bytes.len() != mask.len() {
            return Err(MemoryError::InvalidPattern(format!(
                "pattern is {} bytes but mask is {} bytes",
                bytes.len(),
                mask.len()
            )));
        }
        let bytes = bytes
            .iter()
            .zip(mask.iter())
            .map(|(&b, &m)| b & m)
            .collect();
        Ok(BytePattern { bytes, mask })
    }

    /// Parses a pattern from hex text (e.g. `"48 8B ?? ?? 89"`)
    ///
    /// `??` (or `?`) marks a wildcard byte; all other tokens must be two
    /// hex digits.
    pub fn from_hex_string(pattern: &str) -> MemoryResult<Self> {
        let parts: Vec<&str> = pattern.split_whitespace().collect();

        if parts.is_empty() {
            return Err(MemoryError::InvalidPattern("Empty pattern".to_string()));
        }

        let mut bytes = Vec::with_capacity(parts.len());
        let mut mask = Vec::with_capacity(parts.len());

        for part in parts {
            if part == "??" || part == "?" {
                bytes.push(0x00);
                mask.push(0x00);
            } else {
                if part.len() != 2 {
                    return Err(MemoryError::InvalidPattern(format!(
                        "Invalid hex byte '{}': must be 2 digits",
                        part
                    )));
                }
                let decoded = hex::decode(part)
                    .map_err(|_| MemoryError::InvalidPattern(format!("Invalid hex: {}", part)))?;
                bytes.push(decoded[0]);
                mask.push(0xFF);
            }
        }

        Ok(BytePattern { bytes, mask })
    }

    /// Gets the pattern length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Checks if the pattern is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The pattern bytes (zeroed at wildcard positions)
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The significance mask (`0xFF` significant, `0x00` wildcard)
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Checks whether any position is a wildcard
    pub fn has_wildcards(&self) -> bool {
        self.mask.iter().any(|&m| m != 0xFF)
    }

    /// First significant byte and its offset, if any position is significant
    ///
    /// Used by the byte-pattern scanner to skip ahead between candidates.
    pub fn first_significant(&self) -> Option<(usize, u8)> {
        self.mask
            .iter()
            .position(|&m| m == 0xFF)
            .map(|index| (index, self.bytes[index]))
    }

    /// Checks whether the pattern matches `data` at its start
    pub fn matches(&self, data: &[u8]) -> bool {
        if data.len() < self.bytes.len() {
            return false;
        }
        self.bytes
            .iter()
            .zip(self.mask.iter())
            .zip(data.iter())
            .all(|((&b, &m), &d)| (d & m) == b)
    }
}

impl fmt::Display for BytePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (&b, &m)) in self.bytes.iter().zip(self.mask.iter()).enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            if m == 0x00 {
                write!(f, "??")?;
            } else {
                write!(f, "{:02X}", b)?;
            }
        }
        Ok(())
    }
}
