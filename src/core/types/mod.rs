//! Fundamental types shared across the scanning core

pub mod address;
pub mod error;
pub mod pattern;
pub mod value;

pub use address::Address;
pub use error::{MemoryError, MemoryResult};
pub use pattern::BytePattern;
pub use value::{MemoryValue, ValueType};
