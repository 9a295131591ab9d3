//! An ordered collection of regions captured from a target process

use super::read_group::ReadGroup;
use super::region::SnapshotRegion;
use crate::core::types::Address;
use std::sync::Arc;
use std::time::SystemTime;

/// Immutable-after-construction set of snapshot regions plus metadata
///
/// Regions are kept sorted by base address and assumed non-overlapping;
/// construction sorts defensively. Byte counts are aggregated once so the
/// history manager can apply its retention ceiling without walking regions.
#[derive(Debug)]
pub struct Snapshot {
    name: String,
    regions: Vec<SnapshotRegion>,
    byte_count: u64,
    created_at: SystemTime,
}

impl Snapshot {
    /// Creates a snapshot from a set of regions, sorting them by address
    pub fn new(name: impl Into<String>, mut regions: Vec<SnapshotRegion>) -> Self {
        regions.sort_by_key(|region| region.base_address());
        let byte_count = regions.iter().map(|region| region.size() as u64).sum();
        Snapshot {
            name: name.into(),
            regions,
            byte_count,
            created_at: SystemTime::now(),
        }
    }

    /// Creates an empty snapshot ("no active snapshot" marker)
    pub fn empty(name: impl Into<String>) -> Self {
        Snapshot::new(name, Vec::new())
    }

    /// The snapshot's name tag
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creation time of the snapshot
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// The regions, ordered ascending by base address
    pub fn regions(&self) -> &[SnapshotRegion] {
        &self.regions
    }

    /// Number of regions
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Total bytes across all regions
    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    /// Checks whether the snapshot has no regions
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Total element count for a data size and alignment stride
    pub fn element_count(&self, element_size: usize, alignment: usize) -> u64 {
        self.regions
            .iter()
            .map(|region| region.element_count(element_size, alignment) as u64)
            .sum()
    }

    /// Binary search for the region containing an absolute address
    pub fn region_containing(&self, address: Address) -> Option<&SnapshotRegion> {
        let index = self
            .regions
            .partition_point(|region| region.end_address() <= address);
        self.regions
            .get(index)
            .filter(|region| region.contains_address(address))
    }

    /// Region indices ordered descending by size
    ///
    /// Greedy largest-first scheduling keeps the parallel scan free of
    /// long-pole stragglers when shard counts don't divide thread counts.
    pub fn optimized_region_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.regions.len()).collect();
        order.sort_by(|&a, &b| self.regions[b].size().cmp(&self.regions[a].size()));
        order
    }

    /// The distinct read groups referenced by this snapshot, in region order
    ///
    /// Used when refreshing values: each group must be read exactly once
    /// even when many regions share it.
    pub fn distinct_read_groups(&self) -> Vec<Arc<ReadGroup>> {
        let mut groups: Vec<Arc<ReadGroup>> = Vec::new();
        for region in &self.regions {
            if !groups
                .iter()
                .any(|group| Arc::ptr_eq(group, region.read_group()))
            {
                groups.push(region.read_group().clone());
            }
        }
        groups
    }
}
