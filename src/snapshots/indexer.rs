//! Element-index addressing over a snapshot's regions

use super::snapshot::Snapshot;
use crate::core::types::Address;

/// Maps flat element indices to addresses across a snapshot's regions
///
/// Scan results are conventionally displayed as a flat, zero-based list of
/// elements; this indexer precomputes cumulative element counts per region
/// for one `(element_size, alignment)` pair so index lookups are a binary
/// search plus an offset multiply.
#[derive(Debug)]
pub struct SnapshotElementIndexer<'a> {
    snapshot: &'a Snapshot,
    element_size: usize,
    alignment: usize,
    /// cumulative[i] = total elements in regions [0, i)
    cumulative: Vec<u64>,
}

impl<'a> SnapshotElementIndexer<'a> {
    /// Builds the cumulative index for one data size and alignment stride
    pub fn new(snapshot: &'a Snapshot, element_size: usize, alignment: usize) -> Self {
        let mut cumulative = Vec::with_capacity(snapshot.region_count() + 1);
        let mut total = 0u64;
        cumulative.push(0);
        for region in snapshot.regions() {
            total += region.element_count(element_size, alignment) as u64;
            cumulative.push(total);
        }
        SnapshotElementIndexer {
            snapshot,
            element_size,
            alignment,
            cumulative,
        }
    }

    /// Total number of elements across the snapshot
    pub fn element_count(&self) -> u64 {
        *self.cumulative.last().unwrap_or(&0)
    }

    /// Index of the region containing a flat element index
    pub fn region_index_of(&self, element_index: u64) -> Option<usize> {
        if element_index >= self.element_count() {
            return None;
        }
        // partition_point finds the first region whose cumulative end exceeds
        // the index; cumulative[0] is always 0.
        Some(
            self.cumulative
                .partition_point(|&count| count <= element_index)
                - 1,
        )
    }

    /// First element index of the given region (its element-index base)
    pub fn base_element_index(&self, region_index: usize) -> Option<u64> {
        if region_index >= self.snapshot.region_count() {
            return None;
        }
        Some(self.cumulative[region_index])
    }

    /// Absolute address of a flat element index
    pub fn address_of(&self, element_index: u64) -> Option<Address> {
        let region_index = self.region_index_of(element_index)?;
        let region = &self.snapshot.regions()[region_index];
        let local = element_index - self.cumulative[region_index];
        Some(
            region
                .base_address()
                .offset((local as usize * self.alignment) as i64),
        )
    }

    /// Decoded element size this indexer was built for
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Alignment stride this indexer was built for
    pub fn alignment(&self) -> usize {
        self.alignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshots::{ReadGroup, SnapshotRegion};
    use std::sync::Arc;

    fn snapshot() -> Snapshot {
        let a = Arc::new(ReadGroup::with_values(Address::new(0x1000), vec![0u8; 16]));
        let b = Arc::new(ReadGroup::with_values(Address::new(0x2000), vec![0u8; 8]));
        Snapshot::new(
            "indexed",
            vec![SnapshotRegion::from_group(a), SnapshotRegion::from_group(b)],
        )
    }

    #[test]
    fn test_element_count() {
        let snapshot = snapshot();
        let indexer = SnapshotElementIndexer::new(&snapshot, 4, 4);
        assert_eq!(indexer.element_count(), 4 + 2);
    }

    #[test]
    fn test_region_lookup() {
        let snapshot = snapshot();
        let indexer = SnapshotElementIndexer::new(&snapshot, 4, 4);
        assert_eq!(indexer.region_index_of(0), Some(0));
        assert_eq!(indexer.region_index_of(3), Some(0));
        assert_eq!(indexer.region_index_of(4), Some(1));
        assert_eq!(indexer.region_index_of(5), Some(1));
        assert_eq!(indexer.region_index_of(6), None);
    }

    #[test]
    fn test_base_element_index() {
        let snapshot = snapshot();
        let indexer = SnapshotElementIndexer::new(&snapshot, 4, 4);
        assert_eq!(indexer.base_element_index(0), Some(0));
        assert_eq!(indexer.base_element_index(1), Some(4));
        assert_eq!(indexer.base_element_index(2), None);
    }

    #[test]
    fn test_address_of() {
        let snapshot = snapshot();
        let indexer = SnapshotElementIndexer::new(&snapshot, 4, 4);
        assert_eq!(indexer.address_of(0), Some(Address::new(0x1000)));
        assert_eq!(indexer.address_of(3), Some(Address::new(0x100C)));
        assert_eq!(indexer.address_of(4), Some(Address::new(0x2000)));
        assert_eq!(indexer.address_of(6), None);
    }

    #[test]
    fn test_stride_differs_from_size() {
        let snapshot = snapshot();
        // 1-byte elements at 4-byte stride.
        let indexer = SnapshotElementIndexer::new(&snapshot, 1, 4);
        assert_eq!(indexer.element_count(), 4 + 2);
        assert_eq!(indexer.address_of(1), Some(Address::new(0x1004)));
    }
}
