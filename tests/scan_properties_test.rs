//! Cross-cutting scan properties: partitioning, boundary correctness,
//! round-trips, and the worked examples.

use snapshot_scan::scanning::{
    scan_snapshot, Constraint, ConstraintKind, MemoryAlignment, ScanConstraints,
};
use snapshot_scan::{
    Address, BytePattern, MemoryError, MemoryValue, ReadGroup, Snapshot, SnapshotRegion, ValueType,
};
use std::sync::Arc;

const BASE: u64 = 0x10_0000;

fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E3779B97F4A7C15).wrapping_add(1);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as u8
        })
        .collect()
}

fn snapshot_view(bytes: Vec<u8>, offset: usize, size: usize) -> Snapshot {
    let group = Arc::new(ReadGroup::with_values(Address::new(BASE), bytes));
    Snapshot::new("props", vec![SnapshotRegion::new(group, offset, size)])
}

fn result_offsets(results: &Snapshot) -> Vec<(usize, usize)> {
    results
        .regions()
        .iter()
        .map(|region| ((region.base_address().as_u64() - BASE) as usize, region.size()))
        .collect()
}

/// Partition property: output ranges are ascending, non-overlapping, and
/// confined to the scanned range; the gaps between them are exactly the
/// non-matching elements.
#[test]
fn test_partition_property() {
    let bytes: Vec<u8> = pseudo_random_bytes(2000, 99)
        .into_iter()
        .map(|b| b % 3)
        .collect();
    let offset = 4;
    let size = 1900;

    let constraints = ScanConstraints::new(
        ValueType::U8,
        Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U8(0)),
    )
    .with_alignment(MemoryAlignment::One);

    let snapshot = snapshot_view(bytes.clone(), offset, size);
    let results = scan_snapshot(&snapshot, &constraints).unwrap();
    let ranges = result_offsets(&results);

    // Confined to the input range.
    for &(start, len) in &ranges {
        assert!(start >= offset);
        assert!(start + len <= offset + size);
    }

    // Ascending and non-overlapping, with non-empty gaps between runs.
    for pair in ranges.windows(2) {
        assert!(pair[0].0 + pair[0].1 < pair[1].0);
    }

    // Membership: every byte inside a range matches, every byte in a gap
    // does not.
    let mut covered = vec![false; bytes.len()];
    for &(start, len) in &ranges {
        for position in start..start + len {
            covered[position] = true;
        }
    }
    for position in offset..offset + size {
        assert_eq!(
            covered[position],
            bytes[position] == 0,
            "partition violated at offset {}",
            position
        );
    }
}

/// Misalignment/overread: a range whose offset and size are not multiples
/// of the vector width reports matches only within its true bounds, even
/// when adjacent group bytes would match.
#[test]
fn test_misaligned_range_reports_no_borrowed_bytes() {
    // The whole group matches, but only [10, 10 + 46) is scanned.
    let bytes = vec![7u8; 128];
    let offset = 10;
    let size = 46;

    let constraints = ScanConstraints::new(
        ValueType::U8,
        Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U8(7)),
    )
    .with_alignment(MemoryAlignment::One);

    let snapshot = snapshot_view(bytes, offset, size);
    let results = scan_snapshot(&snapshot, &constraints).unwrap();
    assert_eq!(result_offsets(&results), vec![(offset, size)]);
}

#[test]
fn test_vector_width_boundary_sizes() {
    // Sizes straddling multiples of the vector width, all-matching data:
    // exactly one run of exactly the scanned size each time.
    for size in [15usize, 16, 17, 31, 32, 33, 47, 48, 49] {
        let constraints = ScanConstraints::new(
            ValueType::U8,
            Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U8(1)),
        )
        .with_alignment(MemoryAlignment::One);

        let snapshot = snapshot_view(vec![1u8; 64], 0, size);
        let results = scan_snapshot(&snapshot, &constraints).unwrap();
        assert_eq!(result_offsets(&results), vec![(0, size)], "size {}", size);
    }
}

/// Sparse round-trip: re-scanning the reported addresses for Equal to the
/// found value reproduces the same address set.
#[test]
fn test_sparse_round_trip() {
    let mut bytes = pseudo_random_bytes(512, 41);
    for position in (0..512).step_by(4) {
        // Make roughly half the stride positions match.
        bytes[position] = if position % 8 == 0 { 42 } else { 0 };
    }

    let constraints = ScanConstraints::new(
        ValueType::U8,
        Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U8(42)),
    )
    .with_alignment(MemoryAlignment::Four);

    let snapshot = snapshot_view(bytes.clone(), 0, 512);
    let first = scan_snapshot(&snapshot, &constraints).unwrap();
    assert!(first.region_count() > 0);

    let first_addresses: Vec<u64> = first
        .regions()
        .iter()
        .flat_map(|region| {
            let start = region.base_address().as_u64();
            (0..region.size() as u64 / 4).map(move |i| start + i * 4)
        })
        .collect();

    // Second scan over the narrowed regions.
    let second = scan_snapshot(&first, &constraints).unwrap();
    let second_addresses: Vec<u64> = second
        .regions()
        .iter()
        .flat_map(|region| {
            let start = region.base_address().as_u64();
            (0..region.size() as u64 / 4).map(move |i| start + i * 4)
        })
        .collect();

    assert_eq!(first_addresses, second_addresses);
}

/// Staggered round-trip at 1-byte alignment with 4-byte elements.
#[test]
fn test_staggered_round_trip() {
    let target = 0x5A5A5A5Au32;
    let mut bytes = vec![0u8; 256];
    bytes[33..37].copy_from_slice(&target.to_le_bytes());
    bytes[100..104].copy_from_slice(&target.to_le_bytes());

    let constraints = ScanConstraints::new(
        ValueType::U32,
        Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U32(target)),
    )
    .with_alignment(MemoryAlignment::One);

    let snapshot = snapshot_view(bytes, 0, 256);
    let first = scan_snapshot(&snapshot, &constraints).unwrap();
    let first_addresses: Vec<u64> = first
        .regions()
        .iter()
        .map(|region| region.base_address().as_u64())
        .collect();
    assert_eq!(first_addresses, vec![BASE + 33, BASE + 100]);

    let second = scan_snapshot(&first, &constraints).unwrap();
    let second_addresses: Vec<u64> = second
        .regions()
        .iter()
        .map(|region| region.base_address().as_u64())
        .collect();
    assert_eq!(first_addresses, second_addresses);
}

/// Worked example: int16 [10, 20, 10, 20] little-endian at alignment 2.
#[test]
fn test_worked_example_int16() {
    let constraints = ScanConstraints::new(
        ValueType::I16,
        Constraint::scan_with(ConstraintKind::Equal, MemoryValue::I16(10)),
    )
    .with_alignment(MemoryAlignment::Two);

    let snapshot = snapshot_view(vec![10, 0, 20, 0, 10, 0, 20, 0], 0, 8);
    let results = scan_snapshot(&snapshot, &constraints).unwrap();
    assert_eq!(result_offsets(&results), vec![(0, 2), (4, 2)]);
}

/// Worked example: pattern DE AD ?? EF with a wildcard third byte.
#[test]
fn test_worked_example_byte_pattern() {
    let pattern = BytePattern::from_hex_string("DE AD ?? EF").unwrap();
    let constraints = ScanConstraints::new(
        ValueType::Bytes,
        Constraint::scan_with(ConstraintKind::Equal, MemoryValue::Bytes(pattern)),
    );

    let snapshot = snapshot_view(vec![0xDE, 0xAD, 0x00, 0xEF, 0xDE, 0xAD, 0xFF, 0xEF], 0, 8);
    let results = scan_snapshot(&snapshot, &constraints).unwrap();
    let offsets: Vec<usize> = result_offsets(&results)
        .into_iter()
        .map(|(offset, _)| offset)
        .collect();
    assert_eq!(offsets, vec![0, 4]);
}

/// Relative-constraint guard: a scan against a group with no previous
/// values must be rejected, detectably, not silently evaluated.
#[test]
fn test_relative_guard() {
    let snapshot = snapshot_view(vec![0u8; 64], 0, 64);
    assert!(!snapshot.regions()[0].can_compare());

    let constraints =
        ScanConstraints::new(ValueType::U8, Constraint::scan(ConstraintKind::Changed));
    let result = scan_snapshot(&snapshot, &constraints);
    assert!(matches!(
        result,
        Err(MemoryError::PreviousValuesUnavailable { .. })
    ));

    // After a refresh the same scan proceeds.
    snapshot.regions()[0]
        .read_group()
        .set_current_values(vec![1u8; 64])
        .unwrap();
    assert!(snapshot.regions()[0].can_compare());
    let results = scan_snapshot(&snapshot, &constraints).unwrap();
    assert_eq!(result_offsets(&results), vec![(0, 64)]);
}

/// Results reference the input's read group: narrowing never copies bytes.
#[test]
fn test_results_share_read_groups() {
    let group = Arc::new(ReadGroup::with_values(Address::new(BASE), vec![5u8; 256]));
    let snapshot = Snapshot::new("shared", vec![SnapshotRegion::from_group(group.clone())]);

    let constraints = ScanConstraints::new(
        ValueType::U8,
        Constraint::scan_with(ConstraintKind::Equal, MemoryValue::U8(5)),
    )
    .with_alignment(MemoryAlignment::One);
    let results = scan_snapshot(&snapshot, &constraints).unwrap();
    assert_eq!(results.region_count(), 1);
    assert!(Arc::ptr_eq(results.regions()[0].read_group(), &group));
}
