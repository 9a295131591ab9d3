//! Byte-array pattern scanner
//!
//! Every aligned byte offset is a candidate pattern start, so the scan
//! advances one alignment step at a time rather than one vector at a
//! time. The compiled scalar closure performs the chunked masked compare
//! (AND-reduced with early exit); for a plain single-leaf `Equal` scan
//! with a significant first byte, `memchr` jumps the cursor between
//! candidates instead of probing every offset.

use super::super::comparers::ScalarComparer;
use super::super::constraints::{Constraint, ConstraintKind, ScanConstraints};
use super::super::encoder::{ByteRange, RunLengthEncoder};
use crate::core::types::{MemoryResult, MemoryValue};
use crate::snapshots::SnapshotElementRange;

/// First-byte prefilter, usable only for a lone Equal leaf
fn prefilter_byte(constraints: &ScanConstraints) -> Option<(usize, u8)> {
    match constraints.root() {
        Constraint::Scan(leaf) if leaf.kind == ConstraintKind::Equal => match &leaf.operand {
            Some(MemoryValue::Bytes(pattern)) => pattern.first_significant(),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn scan(
    current: &[u8],
    previous: &[u8],
    range: &SnapshotElementRange,
    pattern_len: usize,
    alignment: usize,
    constraints: &ScanConstraints,
    comparer: &ScalarComparer,
) -> MemoryResult<Vec<ByteRange>> {
    let start = range.range_offset();
    let element_count = range.element_count(pattern_len, alignment);
    let limit = start + element_count * alignment;
    let prefilter = prefilter_byte(constraints);

    let mut encoder = RunLengthEncoder::new(start, limit);
    let mut index = 0;
    while index < element_count {
        let position = start + index * alignment;

        if let Some((significant_offset, significant_byte)) = prefilter {
            let search_from = position + significant_offset;
            match memchr::memchr(significant_byte, &current[search_from..]) {
                Some(0) => {}
                Some(delta) => {
                    // Jump to the next candidate whose significant byte can
                    // line up with the found occurrence.
                    let skipped = delta.div_ceil(alignment).min(element_count - index);
                    encoder.finalize_current_encode(skipped * alignment);
                    index += skipped;
                    continue;
                }
                None => {
                    encoder.finalize_current_encode((element_count - index) * alignment);
                    break;
                }
            }
        }

        let current_slice = &current[position..];
        let previous_slice = previous.get(position..).unwrap_or(&[]);
        if comparer(current_slice, previous_slice) {
            encoder.encode_range(alignment);
        } else {
            encoder.finalize_current_encode(alignment);
        }
        index += 1;
    }

    encoder.close();
    Ok(encoder.into_ranges())
}
