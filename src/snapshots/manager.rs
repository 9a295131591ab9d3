//! Undo/redo history for snapshots with size-bounded retention

use super::snapshot::Snapshot;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Default retention ceiling: snapshots larger than this are not kept in history
pub const DEFAULT_RETENTION_CEILING_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Default)]
struct ManagerStacks {
    undo: Vec<Arc<Snapshot>>,
    redo: Vec<Arc<Snapshot>>,
}

/// Mutex-guarded undo/redo stacks of snapshots
///
/// Saving a snapshot starts a new history branch (the redo stack clears)
/// and evicts the now second-from-top snapshot when it exceeds the byte
/// ceiling, so one oversized whole-memory sweep cannot pin gigabytes in
/// history. The lock is held only for stack operations, never across a
/// scan.
#[derive(Debug)]
pub struct SnapshotManager {
    stacks: Mutex<ManagerStacks>,
    retention_ceiling_bytes: u64,
}

impl SnapshotManager {
    /// Creates a manager with the default retention ceiling
    pub fn new() -> Self {
        Self::with_retention_ceiling(DEFAULT_RETENTION_CEILING_BYTES)
    }

    /// Creates a manager with an explicit retention ceiling in bytes
    pub fn with_retention_ceiling(retention_ceiling_bytes: u64) -> Self {
        SnapshotManager {
            stacks: Mutex::new(ManagerStacks::default()),
            retention_ceiling_bytes,
        }
    }

    /// The configured retention ceiling in bytes
    pub fn retention_ceiling_bytes(&self) -> u64 {
        self.retention_ceiling_bytes
    }

    /// The active snapshot, if any
    ///
    /// An empty snapshot on top of the stack reads as "no active snapshot".
    pub fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        let stacks = self.lock();
        stacks
            .undo
            .last()
            .filter(|snapshot| !snapshot.is_empty())
            .cloned()
    }

    /// Pushes a new snapshot, evicting oversized history and clearing redo
    pub fn save_snapshot(&self, snapshot: Arc<Snapshot>) {
        let mut stacks = self.lock();

        debug!(
            name = snapshot.name(),
            regions = snapshot.region_count(),
            bytes = snapshot.byte_count(),
            "saving snapshot"
        );
        stacks.undo.push(snapshot);

        // The snapshot that just became history is dropped entirely when it
        // exceeds the ceiling; its buffers are too large to retain for undo.
        if stacks.undo.len() >= 2 {
            let second_from_top = stacks.undo.len() - 2;
            let evicted_bytes = stacks.undo[second_from_top].byte_count();
            if evicted_bytes > self.retention_ceiling_bytes {
                let evicted = stacks.undo.remove(second_from_top);
                info!(
                    name = evicted.name(),
                    bytes = evicted_bytes,
                    ceiling = self.retention_ceiling_bytes,
                    "evicting oversized snapshot from history"
                );
            }
        }

        // A new save invalidates any redo branch.
        stacks.redo.clear();
    }

    /// Moves the top snapshot onto the redo stack
    ///
    /// Returns the snapshot that became current, or `None` when the undo
    /// stack is exhausted or the new top is empty.
    pub fn undo_snapshot(&self) -> Option<Arc<Snapshot>> {
        let mut stacks = self.lock();
        let undone = stacks.undo.pop()?;
        debug!(name = undone.name(), "undoing snapshot");
        stacks.redo.push(undone);
        stacks
            .undo
            .last()
            .filter(|snapshot| !snapshot.is_empty())
            .cloned()
    }

    /// Moves the most recently undone snapshot back onto the undo stack
    pub fn redo_snapshot(&self) -> Option<Arc<Snapshot>> {
        let mut stacks = self.lock();
        let redone = stacks.redo.pop()?;
        debug!(name = redone.name(), "redoing snapshot");
        stacks.undo.push(redone.clone());
        if redone.is_empty() {
            return None;
        }
        Some(redone)
    }

    /// Empties both stacks, releasing the last references to their buffers
    pub fn clear_snapshots(&self) {
        let mut stacks = self.lock();
        let dropped = stacks.undo.len() + stacks.redo.len();
        stacks.undo.clear();
        stacks.redo.clear();
        info!(dropped, "cleared snapshot history");
    }

    /// Depth of the undo stack
    pub fn undo_depth(&self) -> usize {
        self.lock().undo.len()
    }

    /// Depth of the redo stack
    pub fn redo_depth(&self) -> usize {
        self.lock().redo.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManagerStacks> {
        self.stacks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SnapshotManager {
    fn default() -> Self {
        SnapshotManager::new()
    }
}
