//! Address-ranged views into a read group's pooled buffers

use super::element_range::SnapshotElementRange;
use super::read_group::ReadGroup;
use crate::core::types::Address;
use crate::core::VECTOR_WIDTH;
use std::sync::Arc;

/// A `(read group, offset, size)` view over remote memory
///
/// Regions own no bytes; many regions (across many snapshots) share one
/// [`ReadGroup`]. Scan results are expressed as new, narrower regions into
/// the same group.
#[derive(Debug, Clone)]
pub struct SnapshotRegion {
    read_group: Arc<ReadGroup>,
    group_offset: usize,
    size: usize,
}

impl SnapshotRegion {
    /// Creates a region over `[group_offset, group_offset + size)` of the group
    pub fn new(read_group: Arc<ReadGroup>, group_offset: usize, size: usize) -> Self {
        debug_assert!(group_offset + size <= read_group.region_size());
        SnapshotRegion {
            read_group,
            group_offset,
            size,
        }
    }

    /// Creates a region spanning an entire read group
    pub fn from_group(read_group: Arc<ReadGroup>) -> Self {
        let size = read_group.region_size();
        SnapshotRegion {
            read_group,
            group_offset: 0,
            size,
        }
    }

    /// The read group backing this region
    pub fn read_group(&self) -> &Arc<ReadGroup> {
        &self.read_group
    }

    /// Offset of the region within its group
    pub fn group_offset(&self) -> usize {
        self.group_offset
    }

    /// Size of the region in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Absolute base address of the region
    pub fn base_address(&self) -> Address {
        self.read_group
            .base_address()
            .offset(self.group_offset as i64)
    }

    /// Absolute end address (exclusive) of the region
    pub fn end_address(&self) -> Address {
        self.base_address().offset(self.size as i64)
    }

    /// Checks whether an absolute address falls within the region
    pub fn contains_address(&self, address: Address) -> bool {
        address >= self.base_address() && address < self.end_address()
    }

    /// Readiness check for relative constraints, delegated to the group
    pub fn can_compare(&self) -> bool {
        self.read_group.can_compare()
    }

    /// The element range covering the whole region
    pub fn element_range(&self) -> SnapshotElementRange {
        SnapshotElementRange::new(self.read_group.clone(), self.group_offset, self.size)
    }

    /// Number of scannable elements for a data size and alignment stride
    pub fn element_count(&self, element_size: usize, alignment: usize) -> usize {
        self.element_range().element_count(element_size, alignment)
    }

    /// Splits the region into shards of at most `shard_size` bytes
    ///
    /// The shard size is rounded down to a multiple of the vector width so
    /// no shard boundary falls mid-vector; the final shard carries the
    /// remainder. Sharding exists purely to bound per-task work for the
    /// parallel dispatcher.
    pub fn shard(&self, shard_size: usize) -> Vec<SnapshotRegion> {
        let shard_size = (shard_size / VECTOR_WIDTH).max(1) * VECTOR_WIDTH;
        if self.size <= shard_size {
            return vec![self.clone()];
        }

        let mut shards = Vec::with_capacity(self.size.div_ceil(shard_size));
        let mut offset = 0;
        while offset < self.size {
            let len = shard_size.min(self.size - offset);
            shards.push(SnapshotRegion::new(
                self.read_group.clone(),
                self.group_offset + offset,
                len,
            ));
            offset += len;
        }
        shards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(size: usize) -> Arc<ReadGroup> {
        Arc::new(ReadGroup::with_values(Address::new(0x4000), vec![0u8; size]))
    }

    #[test]
    fn test_region_addresses() {
        let region = SnapshotRegion::new(group(256), 0x10, 0x20);
        assert_eq!(region.base_address(), Address::new(0x4010));
        assert_eq!(region.end_address(), Address::new(0x4030));
        assert!(region.contains_address(Address::new(0x4010)));
        assert!(region.contains_address(Address::new(0x402F)));
        assert!(!region.contains_address(Address::new(0x4030)));
    }

    #[test]
    fn test_from_group_spans_everything() {
        let g = group(128);
        let region = SnapshotRegion::from_group(g.clone());
        assert_eq!(region.size(), 128);
        assert_eq!(region.base_address(), g.base_address());
    }

    #[test]
    fn test_shard_rounding() {
        let region = SnapshotRegion::from_group(group(100));
        // 40 rounds down to 32, a multiple of the vector width.
        let shards = region.shard(40);
        assert_eq!(shards.len(), 4);
        assert_eq!(shards[0].size(), 32);
        assert_eq!(shards[1].size(), 32);
        assert_eq!(shards[2].size(), 32);
        assert_eq!(shards[3].size(), 4);

        // Offsets are contiguous and vector-aligned.
        assert_eq!(shards[1].group_offset(), 32);
        assert_eq!(shards[2].group_offset(), 64);
        assert_eq!(shards[3].group_offset(), 96);
    }

    #[test]
    fn test_shard_small_region_is_identity() {
        let region = SnapshotRegion::from_group(group(64));
        let shards = region.shard(1 << 20);
        assert_eq!(shards.len(), 1);
        assert_eq!(shards[0].size(), 64);
    }

    #[test]
    fn test_shards_share_the_group() {
        let region = SnapshotRegion::from_group(group(64));
        let shards = region.shard(16);
        for shard in &shards {
            assert!(Arc::ptr_eq(shard.read_group(), region.read_group()));
        }
    }
}
