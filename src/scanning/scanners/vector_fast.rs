//! Chunked scanner for alignment == element size
//!
//! Reads whole 16-byte chunks from a vector-aligned base pulled back to
//! the nearest boundary at or before the range start. The first chunk's
//! result is ANDed with a misalignment mask (bytes before the true start
//! forced to no-match) and the encoder origin is shifted by the same
//! misalignment; the final chunk is ANDed with an overread mask zeroing
//! spill bytes. Middle chunks need no masking, so uniformly true or false
//! chunks encode or skip 16 bytes in a single step.

use super::super::comparers::VectorComparer;
use super::super::encoder::{ByteRange, RunLengthEncoder};
use super::super::mask::BoolMask16;
use super::load_vector;
use crate::core::types::MemoryResult;
use crate::core::VECTOR_WIDTH;
use crate::snapshots::SnapshotElementRange;

pub(crate) fn scan(
    current: &[u8],
    previous: &[u8],
    range: &SnapshotElementRange,
    element_size: usize,
    comparer: &VectorComparer,
) -> MemoryResult<Vec<ByteRange>> {
    let start = range.range_offset();
    let element_count = range.element_count(element_size, element_size);
    let span = element_count * element_size;
    let limit = start + span;

    let read_base = start & !(VECTOR_WIDTH - 1);
    let misalignment = start - read_base;
    debug_assert!(misalignment % element_size == 0);

    let total = misalignment + span;
    let chunk_count = total.div_ceil(VECTOR_WIDTH);

    let mut encoder = RunLengthEncoder::new(start, limit);
    encoder.adjust_for_misalignment(misalignment);

    for chunk in 0..chunk_count {
        let window_offset = read_base + chunk * VECTOR_WIDTH;
        let current_window = load_vector(current, window_offset);
        let previous_window = load_vector(previous, window_offset);
        let mut result = comparer(&current_window, &previous_window);

        // Boundary chunks mask the bytes that lie outside the true range.
        let mut valid = BoolMask16::ALL;
        if chunk == 0 {
            valid &= BoolMask16::from_byte(misalignment);
        }
        let remaining = total - chunk * VECTOR_WIDTH;
        if remaining < VECTOR_WIDTH {
            valid &= BoolMask16::below_byte(remaining);
        }
        result &= valid;

        if valid.all_true() {
            if result.all_true() {
                encoder.encode_range(VECTOR_WIDTH);
                continue;
            }
            if result.all_false() {
                encoder.finalize_current_encode(VECTOR_WIDTH);
                continue;
            }
        }

        // Mixed chunk: fall back to element granularity. Masked-out
        // boundary elements arrive as non-matches, which re-advances the
        // shifted cursor onto the true range.
        let mut offset = 0;
        while offset < VECTOR_WIDTH {
            if result.byte(offset) {
                encoder.encode_range(element_size);
            } else {
                encoder.finalize_current_encode(element_size);
            }
            offset += element_size;
        }
    }

    encoder.close();
    Ok(encoder.into_ranges())
}
