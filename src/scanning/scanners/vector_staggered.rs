//! Chunked scanner for alignment < element size
//!
//! A multi-byte value checked at sub-element granularity (e.g. a 4-byte
//! value at 1-byte alignment) needs `element_size / alignment` phases per
//! vector position: each phase compares the same window logically shifted
//! by the alignment, masks the result down to that phase's element start
//! markers via the precomputed phase table, and ORs the phases together.
//! The combined mask marks one alignment-wide unit per matching element
//! start; the element's remaining bytes are reachable through the range's
//! spill-over allowance.

use super::super::comparers::VectorComparer;
use super::super::encoder::{ByteRange, RunLengthEncoder};
use super::super::mask::{staggered_phase_masks, BoolMask16};
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
    let phases = staggered_phase_masks(element_size, alignment).ok_or_else(|| {
        MemoryError::UnsupportedConstraint(format!(
            "no staggered phase table for element size {} at alignment {}",
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

        // One sub-scan per phase, each reading the same vector position
        // shifted by the alignment. Phase windows near the buffer tail are
        // staged with zero padding; any lane fed by padding belongs to no
        // countable element and is cleared by the validity mask below.
        let mut combined = BoolMask16::NONE;
        for (phase, phase_mask) in phases.iter().enumerate() {
            let phase_offset = window_offset + phase * alignment;
            let current_window = load_vector(current, phase_offset);
            let previous_window = load_vector(previous, phase_offset);
            let compared = comparer(&current_window, &previous_window);
            combined |= compared.shift_left_bytes(phase * alignment) & *phase_mask;
        }

        let mut valid = BoolMask16::ALL;
        if chunk == 0 {
            valid &= BoolMask16::from_byte(misalignment);
        }
        let remaining = total - chunk * VECTOR_WIDTH;
        if remaining < VECTOR_WIDTH {
            valid &= BoolMask16::below_byte(remaining);
        }

        if valid.all_true() {
            if combined.all_true() {
                encoder.encode_range(VECTOR_WIDTH);
                continue;
            }
            if combined.all_false() {
                encoder.finalize_current_encode(VECTOR_WIDTH);
                continue;
            }
        }

        let result = combined & valid;
        let mut position = 0;
        while position < VECTOR_WIDTH {
            if result.byte(position) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Address, MemoryValue, ValueType};
    use crate::scanning::comparers::compile_vector;
    use crate::scanning::constraints::{Constraint, ConstraintKind, MemoryAlignment, ScanConstraints};
    use crate::snapshots::ReadGroup;
    use std::sync::Arc;

    fn equal_u32_at_1(target: u32) -> VectorComparer {
        let constraints = ScanConstraints::new(
            ValueType::U32,
            Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U32(target)),
        )
        .with_alignment(MemoryAlignment::One);
        compile_vector(&constraints, 4).unwrap()
    }

    fn run(bytes: Vec<u8>, comparer: &VectorComparer) -> Vec<ByteRange> {
        let size = bytes.len();
        let group = Arc::new(ReadGroup::with_values(Address::new(0x1000), bytes));
        let range = SnapshotElementRange::new(group, 0, size);
        let values = range.read_group().values();
        scan(values.current().unwrap(), &[], &range, 4, 1, comparer).unwrap()
    }

    #[test]
    fn test_unaligned_element_start_found() {
        // A u32 value planted at byte 5: only a sub-element phase sees it.
        let target = 0xCAFEBABEu32;
        let mut bytes = vec![0u8; 64];
        bytes[5..9].copy_from_slice(&target.to_le_bytes());
        let ranges = run(bytes, &equal_u32_at_1(target));
        assert_eq!(ranges, vec![ByteRange::new(5, 1)]);
    }

    #[test]
    fn test_every_byte_offset_is_a_candidate() {
        // 0xAAAAAAAA over 8 bytes: starts 0..=4 all read the full value.
        let mut bytes = vec![0u8; 64];
        bytes[8..16].fill(0xAA);
        let ranges = run(bytes, &equal_u32_at_1(0xAAAAAAAA));
        assert_eq!(ranges, vec![ByteRange::new(8, 5)]);
    }

    #[test]
    fn test_phase_window_at_buffer_tail() {
        // Value planted so its bytes spill across the last vector boundary.
        let target = 0x11223344u32;
        let mut bytes = vec![0u8; 40];
        bytes[30..34].copy_from_slice(&target.to_le_bytes());
        let ranges = run(bytes, &equal_u32_at_1(target));
        assert_eq!(ranges, vec![ByteRange::new(30, 1)]);
    }

    #[test]
    fn test_no_matches() {
        let ranges = run(vec![0u8; 64], &equal_u32_at_1(0xDEADBEEF));
        assert!(ranges.is_empty());
    }
}
