//! Scannable value types and the decoded-value union
//!
//! Every scannable primitive is described by a [`ValueType`] tag: size,
//! endianness variant, and comparison semantics (floats tolerate a small
//! epsilon on equality, integers compare exactly, byte arrays compare
//! per-byte under a wildcard mask). [`MemoryValue`] is the decoded
//! counterpart used for constraint operands and scan results.

use super::pattern::BytePattern;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enum identifying one scannable primitive type
///
/// Multi-byte integers and floats each have a big-endian variant for
/// scanning targets with foreign byte order (e.g. emulated consoles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Bool,
    I8,
    I16,
    I16Be,
    I32,
    I32Be,
    I64,
    I64Be,
    U8,
    U16,
    U16Be,
    U32,
    U32Be,
    U64,
    U64Be,
    F32,
    F32Be,
    F64,
    F64Be,
    Bytes,
}

impl ValueType {
    /// Returns the fixed size in bytes, or `None` for variable-size byte arrays
    pub const fn size(&self) -> Option<usize> {
        match self {
            ValueType::Bool | ValueType::I8 | ValueType::U8 => Some(1),
            ValueType::I16 | ValueType::I16Be | ValueType::U16 | ValueType::U16Be => Some(2),
            ValueType::I32
            | ValueType::I32Be
            | ValueType::U32
            | ValueType::U32Be
            | ValueType::F32
            | ValueType::F32Be => Some(4),
            ValueType::I64
            | ValueType::I64Be
            | ValueType::U64
            | ValueType::U64Be
            | ValueType::F64
            | ValueType::F64Be => Some(8),
            ValueType::Bytes => None,
        }
    }

    /// Checks whether this is a big-endian variant
    pub const fn is_big_endian(&self) -> bool {
        matches!(
            self,
            ValueType::I16Be
                | ValueType::I32Be
                | ValueType::I64Be
                | ValueType::U16Be
                | ValueType::U32Be
                | ValueType::U64Be
                | ValueType::F32Be
                | ValueType::F64Be
        )
    }

    /// Checks whether equality comparisons use a floating-point tolerance
    pub const fn is_floating_point(&self) -> bool {
        matches!(
            self,
            ValueType::F32 | ValueType::F32Be | ValueType::F64 | ValueType::F64Be
        )
    }

    /// Default scan alignment: the element size, 1 for byte arrays
    pub const fn default_alignment(&self) -> usize {
        match self.size() {
            Some(size) => size,
            None => 1,
        }
    }

    /// Returns the little-endian counterpart of a big-endian variant
    pub const fn to_little_endian(&self) -> ValueType {
        match self {
            ValueType::I16Be => ValueType::I16,
            ValueType::I32Be => ValueType::I32,
            ValueType::I64Be => ValueType::I64,
            ValueType::U16Be => ValueType::U16,
            ValueType::U32Be => ValueType::U32,
            ValueType::U64Be => ValueType::U64,
            ValueType::F32Be => ValueType::F32,
            ValueType::F64Be => ValueType::F64,
            other => *other,
        }
    }
}

/// Represents a decoded value for one of the scannable types
///
/// Endianness belongs to [`ValueType`], not to the decoded value: a `U32`
/// read from a big-endian target and one read from a little-endian target
/// are the same number once decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MemoryValue {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bytes(BytePattern),
}

macro_rules! decode_primitive {
    ($bytes:expr, $t:ty, $size:expr, $be:expr, $variant:ident) => {{
        if $bytes.len() >= $size {
            let mut raw = [0u8; $size];
            raw.copy_from_slice(&$bytes[..$size]);
            let value = if $be {
                <$t>::from_be_bytes(raw)
            } else {
                <$t>::from_le_bytes(raw)
            };
            Some(MemoryValue::$variant(value))
        } else {
            None
        }
    }};
}

impl MemoryValue {
    /// Returns the size in bytes of the value
    pub fn size(&self) -> usize {
        match self {
            MemoryValue::Bool(_) | MemoryValue::I8(_) | MemoryValue::U8(_) => 1,
            MemoryValue::I16(_) | MemoryValue::U16(_) => 2,
            MemoryValue::I32(_) | MemoryValue::U32(_) | MemoryValue::F32(_) => 4,
            MemoryValue::I64(_) | MemoryValue::U64(_) | MemoryValue::F64(_) => 8,
            MemoryValue::Bytes(pattern) => pattern.len(),
        }
    }

    /// Converts the value to little-endian bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MemoryValue::Bool(v) => vec![u8::from(*v)],
            MemoryValue::I8(v) => v.to_le_bytes().to_vec(),
            MemoryValue::I16(v) => v.to_le_bytes().to_vec(),
            MemoryValue::I32(v) => v.to_le_bytes().to_vec(),
            MemoryValue::I64(v) => v.to_le_bytes().to_vec(),
            MemoryValue::U8(v) => v.to_le_bytes().to_vec(),
            MemoryValue::U16(v) => v.to_le_bytes().to_vec(),
            MemoryValue::U32(v) => v.to_le_bytes().to_vec(),
            MemoryValue::U64(v) => v.to_le_bytes().to_vec(),
            MemoryValue::F32(v) => v.to_le_bytes().to_vec(),
            MemoryValue::F64(v) => v.to_le_bytes().to_vec(),
            MemoryValue::Bytes(pattern) => pattern.bytes().to_vec(),
        }
    }

    /// Decodes a value from raw bytes according to the given type tag
    ///
    /// Big-endian variants decode with reversed byte order; the returned
    /// value is endianness-free.
    pub fn from_bytes(bytes: &[u8], value_type: ValueType) -> Option<Self> {
        let be = value_type.is_big_endian();
        match value_type {
            ValueType::Bool => bytes.first().map(|&b| MemoryValue::Bool(b != 0)),
            ValueType::I8 => bytes.first().map(|&b| MemoryValue::I8(b as i8)),
            ValueType::U8 => bytes.first().map(|&b| MemoryValue::U8(b)),
            ValueType::I16 | ValueType::I16Be => decode_primitive!(bytes, i16, 2, be, I16),
            ValueType::I32 | ValueType::I32Be => decode_primitive!(bytes, i32, 4, be, I32),
            ValueType::I64 | ValueType::I64Be => decode_primitive!(bytes, i64, 8, be, I64),
            ValueType::U16 | ValueType::U16Be => decode_primitive!(bytes, u16, 2, be, U16),
            ValueType::U32 | ValueType::U32Be => decode_primitive!(bytes, u32, 4, be, U32),
            ValueType::U64 | ValueType::U64Be => decode_primitive!(bytes, u64, 8, be, U64),
            ValueType::F32 | ValueType::F32Be => decode_primitive!(bytes, f32, 4, be, F32),
            ValueType::F64 | ValueType::F64Be => decode_primitive!(bytes, f64, 8, be, F64),
            ValueType::Bytes => Some(MemoryValue::Bytes(BytePattern::from_bytes(bytes.to_vec()))),
        }
    }

    /// Gets the (little-endian) value type tag for this value
    pub fn value_type(&self) -> ValueType {
        match self {
            MemoryValue::Bool(_) => ValueType::Bool,
            MemoryValue::I8(_) => ValueType::I8,
            MemoryValue::I16(_) => ValueType::I16,
            MemoryValue::I32(_) => ValueType::I32,
            MemoryValue::I64(_) => ValueType::I64,
            MemoryValue::U8(_) => ValueType::U8,
            MemoryValue::U16(_) => ValueType::U16,
            MemoryValue::U32(_) => ValueType::U32,
            MemoryValue::U64(_) => ValueType::U64,
            MemoryValue::F32(_) => ValueType::F32,
            MemoryValue::F64(_) => ValueType::F64,
            MemoryValue::Bytes(_) => ValueType::Bytes,
        }
    }

    /// Checks whether this value can serve as an operand for the given type
    pub fn matches_type(&self, value_type: ValueType) -> bool {
        self.value_type() == value_type.to_little_endian()
    }
}

impl fmt::Display for MemoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryValue::Bool(v) => write!(f, "{}", v),
            MemoryValue::I8(v) => write!(f, "{}", v),
            MemoryValue::I16(v) => write!(f, "{}", v),
            MemoryValue::I32(v) => write!(f, "{}", v),
            MemoryValue::I64(v) => write!(f, "{}", v),
            MemoryValue::U8(v) => write!(f, "{}", v),
            MemoryValue::U16(v) => write!(f, "{}", v),
            MemoryValue::U32(v) => write!(f, "{}", v),
            MemoryValue::U64(v) => write!(f, "{}", v),
            MemoryValue::F32(v) => write!(f, "{}", v),
            MemoryValue::F64(v) => write!(f, "{}", v),
            MemoryValue::Bytes(pattern) => write!(f, "{}", pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_sizes() {
        assert_eq!(ValueType::Bool.size(), Some(1));
        assert_eq!(ValueType::I16.size(), Some(2));
        assert_eq!(ValueType::U32Be.size(), Some(4));
        assert_eq!(ValueType::F64.size(), Some(8));
        assert_eq!(ValueType::Bytes.size(), None);
    }

    #[test]
    fn test_value_type_flags() {
        assert!(ValueType::U32Be.is_big_endian());
        assert!(!ValueType::U32.is_big_endian());
        assert!(ValueType::F32.is_floating_point());
        assert!(ValueType::F64Be.is_floating_point());
        assert!(!ValueType::I64.is_floating_point());
        assert_eq!(ValueType::U64Be.to_little_endian(), ValueType::U64);
        assert_eq!(ValueType::Bytes.default_alignment(), 1);
        assert_eq!(ValueType::U32.default_alignment(), 4);
    }

    #[test]
    fn test_value_size() {
        assert_eq!(MemoryValue::I32(42).size(), 4);
        assert_eq!(MemoryValue::U64(100).size(), 8);
        assert_eq!(MemoryValue::F32(3.25).size(), 4);
        assert_eq!(
            MemoryValue::Bytes(BytePattern::from_bytes(vec![1, 2, 3])).size(),
            3
        );
    }

    #[test]
    fn test_value_to_bytes() {
        assert_eq!(
            MemoryValue::U32(0x12345678).to_bytes(),
            vec![0x78, 0x56, 0x34, 0x12]
        );
        assert_eq!(MemoryValue::I8(-1).to_bytes(), vec![0xFF]);
        assert_eq!(MemoryValue::Bool(true).to_bytes(), vec![1]);
    }

    #[test]
    fn test_value_from_bytes() {
        let bytes = vec![0x78, 0x56, 0x34, 0x12];
        let value = MemoryValue::from_bytes(&bytes, ValueType::U32).unwrap();
        assert_eq!(value, MemoryValue::U32(0x12345678));

        let value = MemoryValue::from_bytes(&bytes, ValueType::U32Be).unwrap();
        assert_eq!(value, MemoryValue::U32(0x78563412));

        assert!(MemoryValue::from_bytes(&bytes[..2], ValueType::U32).is_none());
    }

    #[test]
    fn test_big_endian_float_round_trip() {
        let bytes = 1.5f32.to_be_bytes();
        let value = MemoryValue::from_bytes(&bytes, ValueType::F32Be).unwrap();
        assert_eq!(value, MemoryValue::F32(1.5));
    }

    #[test]
    fn test_matches_type() {
        assert!(MemoryValue::U16(7).matches_type(ValueType::U16));
        assert!(MemoryValue::U16(7).matches_type(ValueType::U16Be));
        assert!(!MemoryValue::U16(7).matches_type(ValueType::U32));
    }

    #[test]
    fn test_serde_round_trip() {
        let value = MemoryValue::I64(-9000);
        let json = serde_json::to_string(&value).unwrap();
        let back: MemoryValue = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
