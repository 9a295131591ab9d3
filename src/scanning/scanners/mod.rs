//! Scanning strategies over snapshot element ranges
//!
//! All strategies share one shape: walk the element range, evaluate the
//! compiled constraint at each position, feed boolean results to the
//! run-length encoder, and return the collected group-relative ranges.
//! They differ in the unit of work (single element, element-by-element,
//! or 16-byte vector chunk) and in the masking needed at range boundaries.

pub mod byte_pattern;
pub mod iterative;
pub mod single_element;
pub mod vector_fast;
pub mod vector_sparse;
pub mod vector_staggered;

use super::comparers::CompiledComparers;
use super::constraints::ScanConstraints;
use super::encoder::ByteRange;
use crate::core::types::{MemoryError, MemoryResult, ValueType};
use crate::core::VECTOR_WIDTH;
use crate::snapshots::SnapshotElementRange;
use tracing::trace;

/// Loads a 16-byte window at `offset`, zero-padding past the buffer end
///
/// The zero padding only ever backs bytes that a boundary mask forces to
/// "no match" or that belong to no countable element, so it cannot fake a
/// match.
#[inline]
pub(crate) fn load_vector(buffer: &[u8], offset: usize) -> [u8; VECTOR_WIDTH] {
    let mut window = [0u8; VECTOR_WIDTH];
    if offset < buffer.len() {
        let available = (buffer.len() - offset).min(VECTOR_WIDTH);
        window[..available].copy_from_slice(&buffer[offset..offset + available]);
    }
    window
}

/// The scanning strategy chosen for one element range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Exactly one element in the range
    SingleElement,
    /// Scalar walk; ranges too small (or too oddly placed) to vectorize
    Iterative,
    /// Chunked scan, alignment == element size
    VectorFast,
    /// Chunked scan, alignment > element size
    VectorSparse,
    /// Chunked scan, alignment < element size
    VectorStaggered,
    /// Byte-array pattern scan, candidate starts at every alignment step
    BytePattern,
}

impl ScanStrategy {
    /// Selects the strategy for a range and constraint set
    pub fn select(
        range: &SnapshotElementRange,
        constraints: &ScanConstraints,
    ) -> MemoryResult<ScanStrategy> {
        if constraints.value_type() == ValueType::Bytes {
            return Ok(ScanStrategy::BytePattern);
        }

        let element_size = constraints.element_size()?;
        let alignment = constraints.alignment().as_usize();
        let element_count = range.element_count(element_size, alignment);

        if element_count == 1 {
            return Ok(ScanStrategy::SingleElement);
        }
        // The vector lane math assumes element starts aligned to the stride
        // within the group; an off-stride range offset falls back to the
        // scalar walk, as do ranges shorter than two vector widths.
        if range.range_offset() % alignment != 0
            || element_count * alignment < 2 * VECTOR_WIDTH
        {
            return Ok(ScanStrategy::Iterative);
        }

        Ok(match alignment.cmp(&element_size) {
            std::cmp::Ordering::Equal => ScanStrategy::VectorFast,
            std::cmp::Ordering::Greater => ScanStrategy::VectorSparse,
            std::cmp::Ordering::Less => ScanStrategy::VectorStaggered,
        })
    }
}

fn require_vector(comparers: &CompiledComparers) -> MemoryResult<&super::comparers::VectorComparer> {
    comparers.vector().ok_or_else(|| {
        MemoryError::UnsupportedConstraint(
            "vector strategy selected without a vector comparer".to_string(),
        )
    })
}

/// Scans one element range with the precompiled comparers
///
/// Readiness is checked once per range, never per element: missing
/// current values (or missing previous values under a relative
/// constraint) reject the whole range. Returned ranges are relative to
/// the range's read group.
pub fn scan_element_range(
    range: &SnapshotElementRange,
    constraints: &ScanConstraints,
    comparers: &CompiledComparers,
) -> MemoryResult<Vec<ByteRange>> {
    let element_size = constraints.element_size()?;
    let alignment = constraints.alignment().as_usize();
    if range.element_count(element_size, alignment) == 0 {
        return Ok(Vec::new());
    }

    let values = range.read_group().values();
    let current = values.current().ok_or_else(|| {
        MemoryError::current_values_unavailable(range.read_group().base_address())
    })?;
    let previous = values.previous().unwrap_or(&[]);
    if constraints.is_relative() && previous.len() != current.len() {
        return Err(MemoryError::previous_values_unavailable(
            range.read_group().base_address(),
        ));
    }

    let strategy = ScanStrategy::select(range, constraints)?;
    trace!(
        ?strategy,
        offset = range.range_offset(),
        size = range.range_size(),
        "scanning element range"
    );

    match strategy {
        ScanStrategy::SingleElement => single_element::scan(
            current,
            previous,
            range,
            element_size,
            alignment,
            comparers.scalar(),
        ),
        ScanStrategy::Iterative => iterative::scan(
            current,
            previous,
            range,
            element_size,
            alignment,
            comparers.scalar(),
        ),
        ScanStrategy::VectorFast => {
            vector_fast::scan(current, previous, range, element_size, require_vector(comparers)?)
        }
        ScanStrategy::VectorSparse => vector_sparse::scan(
            current,
            previous,
            range,
            element_size,
            alignment,
            require_vector(comparers)?,
        ),
        ScanStrategy::VectorStaggered => vector_staggered::scan(
            current,
            previous,
            range,
            element_size,
            alignment,
            require_vector(comparers)?,
        ),
        ScanStrategy::BytePattern => byte_pattern::scan(
            current,
            previous,
            range,
            element_size,
            alignment,
            constraints,
            comparers.scalar(),
        ),
    }
}
