//! Scanner for ranges holding exactly one element

use super::super::comparers::ScalarComparer;
use super::super::encoder::ByteRange;
use crate::core::types::MemoryResult;
use crate::snapshots::SnapshotElementRange;

/// Reads exactly one element's bytes and returns one range or none
pub(crate) fn scan(
    current: &[u8],
    previous: &[u8],
    range: &SnapshotElementRange,
    _element_size: usize,
    alignment: usize,
    comparer: &ScalarComparer,
) -> MemoryResult<Vec<ByteRange>> {
    let position = range.range_offset();
    let current_slice = &current[position..];
    let previous_slice = previous.get(position..).unwrap_or(&[]);

    if comparer(current_slice, previous_slice) {
        Ok(vec![ByteRange::new(position, alignment)])
    } else {
        Ok(Vec::new())
    }
}
