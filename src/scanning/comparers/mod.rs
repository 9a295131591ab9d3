//! Constraint compilation into reusable comparison closures
//!
//! Compilation happens once per scan invocation, never per element: the
//! constraint tree is walked a single time and folded into nested closures
//! specialized for the scan's value type, byte order, and strategy shape
//! (scalar boolean vs. 16-byte lane mask).

pub mod pattern;
pub mod scalar;
pub mod vector;

pub use pattern::CompiledPattern;
pub use scalar::{compile_scalar, ScalarComparer};
pub use vector::{compile_vector, VectorComparer};

use crate::core::types::{MemoryResult, ValueType};
use crate::scanning::constraints::ScanConstraints;

/// The closures one scan invocation shares across all of its shards
pub struct CompiledComparers {
    scalar: ScalarComparer,
    vector: Option<VectorComparer>,
}

impl CompiledComparers {
    /// Compiles every comparer form the selected strategies may need
    ///
    /// The vector form is compiled at the lane stride the strategies use:
    /// `max(alignment, element size)` — the element size for fast and
    /// staggered scans, the alignment for sparse scans. Byte-array scans
    /// compile no vector form; their chunked pattern comparison lives in
    /// the scalar closures.
    pub fn compile(constraints: &ScanConstraints) -> MemoryResult<Self> {
        let scalar = compile_scalar(constraints)?;
        let vector = if constraints.value_type() == ValueType::Bytes {
            None
        } else {
            let stride = constraints
                .alignment()
                .as_usize()
                .max(constraints.element_size()?);
            Some(compile_vector(constraints, stride)?)
        };
        Ok(CompiledComparers { scalar, vector })
    }

    /// The scalar (per-element boolean) comparer
    pub fn scalar(&self) -> &ScalarComparer {
        &self.scalar
    }

    /// The vector (per-chunk lane mask) comparer, absent for byte arrays
    pub fn vector(&self) -> Option<&VectorComparer> {
        self.vector.as_ref()
    }
}
