//! Pooled byte buffers for one contiguous span of remote memory
//!
//! A [`ReadGroup`] owns the current/previous value buffers that every
//! [`SnapshotRegion`](super::SnapshotRegion) carved from it borrows. Groups
//! are shared between snapshots (`Arc`), so a filtered scan result never
//! copies bytes; it only records new offsets into the same group.

use crate::core::types::{Address, MemoryError, MemoryResult};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

/// Buffer pair (plus optional labels) guarded by the group's lock
#[derive(Debug, Default)]
struct GroupBuffers {
    current_values: Option<Vec<u8>>,
    previous_values: Option<Vec<u8>>,
    element_labels: Option<Vec<u16>>,
}

/// A contiguous span of remote-process address space with pooled buffers
///
/// `current_values` holds the most recent read and `previous_values` the
/// one before it. Previous values only exist after at least two reads;
/// until then relative constraints (`Changed`, `Increased`, ...) cannot be
/// evaluated against this group (see [`ReadGroup::can_compare`]).
///
/// Refreshing swaps current to previous under the group's write lock while
/// scans hold read locks, so a refresh can never corrupt an in-flight
/// scan's view of the buffers.
#[derive(Debug)]
pub struct ReadGroup {
    base_address: Address,
    region_size: usize,
    buffers: RwLock<GroupBuffers>,
}

impl ReadGroup {
    /// Creates an empty group covering `[base_address, base_address + region_size)`
    pub fn new(base_address: Address, region_size: usize) -> Self {
        ReadGroup {
            base_address,
            region_size,
            buffers: RwLock::new(GroupBuffers::default()),
        }
    }

    /// Creates a group pre-filled with one read of current values
    pub fn with_values(base_address: Address, current_values: Vec<u8>) -> Self {
        let region_size = current_values.len();
        ReadGroup {
            base_address,
            region_size,
            buffers: RwLock::new(GroupBuffers {
                current_values: Some(current_values),
                previous_values: None,
                element_labels: None,
            }),
        }
    }

    /// Base address of the remote span
    pub fn base_address(&self) -> Address {
        self.base_address
    }

    /// End address (exclusive) of the remote span
    pub fn end_address(&self) -> Address {
        self.base_address.offset(self.region_size as i64)
    }

    /// Size in bytes of the remote span
    pub fn region_size(&self) -> usize {
        self.region_size
    }

    /// Checks whether a current-values buffer is present
    pub fn has_current_values(&self) -> bool {
        self.read_buffers().current_values.is_some()
    }

    /// Readiness check for relative constraints
    ///
    /// True only when both buffers are present and the same length; a scan
    /// with a relative constraint must not be issued against a group for
    /// which this returns false.
    pub fn can_compare(&self) -> bool {
        let buffers = self.read_buffers();
        match (&buffers.current_values, &buffers.previous_values) {
            (Some(current), Some(previous)) => current.len() == previous.len(),
            _ => false,
        }
    }

    /// Installs a fresh read, rotating the old current values into previous
    pub fn set_current_values(&self, values: Vec<u8>) -> MemoryResult<()> {
        if values.len() != self.region_size {
            return Err(MemoryError::buffer_too_small(self.region_size, values.len()));
        }
        let mut buffers = self.write_buffers();
        buffers.previous_values = buffers.current_values.take();
        buffers.current_values = Some(values);
        Ok(())
    }

    /// Drops both value buffers and any labels
    pub fn clear_values(&self) {
        let mut buffers = self.write_buffers();
        buffers.current_values = None;
        buffers.previous_values = None;
        buffers.element_labels = None;
    }

    /// Installs per-byte element labels (e.g. change counters)
    pub fn set_element_labels(&self, labels: Vec<u16>) -> MemoryResult<()> {
        if labels.len() != self.region_size {
            return Err(MemoryError::buffer_too_small(self.region_size, labels.len()));
        }
        self.write_buffers().element_labels = Some(labels);
        Ok(())
    }

    /// Acquires a read view of the buffers for the duration of a scan
    pub fn values(&self) -> GroupValues<'_> {
        GroupValues {
            guard: self.read_buffers(),
        }
    }

    fn read_buffers(&self) -> RwLockReadGuard<'_, GroupBuffers> {
        self.buffers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_buffers(&self) -> std::sync::RwLockWriteGuard<'_, GroupBuffers> {
        self.buffers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read-locked view of a group's buffers
///
/// Held by a scanner for the whole of one scan invocation; a concurrent
/// refresh blocks until the view is dropped.
pub struct GroupValues<'a> {
    guard: RwLockReadGuard<'a, GroupBuffers>,
}

impl GroupValues<'_> {
    /// The most recent read, if any
    pub fn current(&self) -> Option<&[u8]> {
        self.guard.current_values.as_deref()
    }

    /// The read before the most recent one, if any
    pub fn previous(&self) -> Option<&[u8]> {
        self.guard.previous_values.as_deref()
    }

    /// Per-byte element labels, if installed
    pub fn element_labels(&self) -> Option<&[u16]> {
        self.guard.element_labels.as_deref()
    }
}
