//! The sub-span of a region that one scan invocation actually processes

use super::read_group::ReadGroup;
use crate::core::types::Address;
use std::sync::Arc;

/// A byte range within a [`ReadGroup`], the unit of work for a scanner
///
/// Element counting accounts for a data type "spilling over" the range's
/// nominal end: a 4-byte value whose first byte is the last in-range byte
/// still reads its remaining 3 bytes from the parent group's buffer, as
/// long as the buffer extends that far.
#[derive(Debug, Clone)]
pub struct SnapshotElementRange {
    read_group: Arc<ReadGroup>,
    range_offset: usize,
    range_size: usize,
}

impl SnapshotElementRange {
    /// Creates a range over `[range_offset, range_offset + range_size)` of the group
    ///
    /// The range must lie within the group's span.
    pub fn new(read_group: Arc<ReadGroup>, range_offset: usize, range_size: usize) -> Self {
        debug_assert!(range_offset + range_size <= read_group.region_size());
        SnapshotElementRange {
            read_group,
            range_offset,
            range_size,
        }
    }

    /// The read group whose buffers this range is a view of
    pub fn read_group(&self) -> &Arc<ReadGroup> {
        &self.read_group
    }

    /// Offset of the range within the group's buffers
    pub fn range_offset(&self) -> usize {
        self.range_offset
    }

    /// Nominal size of the range in bytes
    pub fn range_size(&self) -> usize {
        self.range_size
    }

    /// Absolute address of the first in-range byte
    pub fn base_address(&self) -> Address {
        self.read_group
            .base_address()
            .offset(self.range_offset as i64)
    }

    /// Absolute end address (exclusive) of the nominal range
    pub fn end_address(&self) -> Address {
        self.base_address().offset(self.range_size as i64)
    }

    /// Bytes available from the range start through the end of the parent buffer
    ///
    /// This is the spill-over allowance: it can exceed `range_size` when the
    /// range is an interior shard of a larger group.
    pub fn available_byte_count(&self) -> usize {
        self.read_group.region_size() - self.range_offset
    }

    /// Number of scannable elements for a data size and alignment stride
    ///
    /// An element starts at every `alignment` bytes within the nominal
    /// range; it is counted only when its full `element_size` bytes are
    /// available in the parent buffer (spill-over included).
    pub fn element_count(&self, element_size: usize, alignment: usize) -> usize {
        debug_assert!(alignment > 0 && element_size > 0);
        let stride_count = self.range_size / alignment;
        let available = self.available_byte_count();
        if available < element_size {
            return 0;
        }
        let readable_count = (available - element_size) / alignment + 1;
        stride_count.min(readable_count)
    }

    /// Bytes of the range covered by countable elements at this stride
    ///
    /// This is the run-length encoder's encodable limit: no emitted range
    /// may extend past `range_offset + encodable_size`.
    pub fn encodable_size(&self, element_size: usize, alignment: usize) -> usize {
        self.element_count(element_size, alignment) * alignment
    }
}
