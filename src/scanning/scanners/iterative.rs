//! Scalar fallback scanner: one compiled comparison per element

use super::super::comparers::ScalarComparer;
use super::super::encoder::{ByteRange, RunLengthEncoder};
use crate::core::types::MemoryResult;
use crate::snapshots::SnapshotElementRange;

/// Walks every aligned element with the scalar compiled comparison
///
/// Correct for every alignment/element-size combination; the vectorized
/// strategies must agree with this scanner byte-for-byte.
pub(crate) fn scan(
    current: &[u8],
    previous: &[u8],
    range: &SnapshotElementRange,
    element_size: usize,
    alignment: usize,
    comparer: &ScalarComparer,
) -> MemoryResult<Vec<ByteRange>> {
    let start = range.range_offset();
    let element_count = range.element_count(element_size, alignment);
    let limit = start + element_count * alignment;
    let mut encoder = RunLengthEncoder::new(start, limit);

    for index in 0..element_count {
        let position = start + index * alignment;
        let current_slice = &current[position..];
        let previous_slice = previous.get(position..).unwrap_or(&[]);
        if comparer(current_slice, previous_slice) {
            encoder.encode_range(alignment);
        } else {
            encoder.finalize_current_encode(alignment);
        }
    }

    encoder.close();
    Ok(encoder.into_ranges())
}
