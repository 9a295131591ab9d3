//! Chunked scanner for alignment > element size
//!
//! Only every Nth element start is of interest (e.g. a 1-byte value at
//! 4-byte stride). A precomputed sparse mask marks the in-between bytes
//! always-true and is OR'd into every comparison result before the
//! fast-path checks, so a match run can span the skipped bytes: they are
//! never individually significant and belong to the same contiguous
//! region either way.

use super::super::comparers::VectorComparer;
use super::super::encoder::{ByteRange, RunLengthEncoder};
use super::super::mask::{sparse_mask, BoolMask16};
use super::load_vector;
use crate::core::types::{MemoryError, MemoryResult};
use crate::core::VECTOR_WIDTH;
use crate::snapshots::SnapshotElementRange;

pub(crate) fn scan(
    current: &[u8],
    previous: &[u8],
    range: &SnapshotElementRange,
    element_size: usize,
    alignment: usize,
    comparer: &VectorComparer,
) -> MemoryResult<Vec<ByteRange>> {
    let sparse = sparse_mask(element_size, alignment).ok_or_else(|| {
        MemoryError::UnsupportedConstraint(format!(
            "no sparse mask for element size {} at alignment {}",
            element_size, alignment
        ))
    })?;

    let start = range.range_offset();
    let element_count = range.element_count(element_size, alignment);
    let span = element_count * alignment;
    let limit = start + span;

    let read_base = start & !(VECTOR_WIDTH - 1);
    let misalignment = start - read_base;
    debug_assert!(misalignment % alignment == 0);

    let total = misalignment + span;
    let chunk_count = total.div_ceil(VECTOR_WIDTH);

    let mut encoder = RunLengthEncoder::new(start, limit);
    encoder.adjust_for_misalignment(misalignment);

    for chunk in 0..chunk_count {
        let window_offset = read_base + chunk * VECTOR_WIDTH;
        let current_window = load_vector(current, window_offset);
        let previous_window = load_vector(previous, window_offset);
        let compared = comparer(&current_window, &previous_window) | sparse;

        let mut valid = BoolMask16::ALL;
        if chunk == 0 {
            valid &= BoolMask16::from_byte(misalignment);
        }
        let remaining = total - chunk * VECTOR_WIDTH;
        if remaining < VECTOR_WIDTH {
            valid &= BoolMask16::below_byte(remaining);
        }

        if valid.all_true() {
            // No element matched exactly when only the sparse filler is set.
            if compared.all_true() {
                encoder.encode_range(VECTOR_WIDTH);
                continue;
            }
            if compared == sparse {
                encoder.finalize_current_encode(VECTOR_WIDTH);
                continue;
            }
        }

        let result = compared & valid;
        let mut position = 0;
        while position < VECTOR_WIDTH {
            // The element's start byte carries the comparison result; the
            // sparse filler never touches start bytes.
            if result.byte(position) && valid.byte(position) {
                encoder.encode_range(alignment);
            } else {
                encoder.finalize_current_encode(alignment);
            }
            position += alignment;
        }
    }

    encoder.close();
    Ok(encoder.into_ranges())
}
