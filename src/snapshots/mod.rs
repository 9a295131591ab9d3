//! The snapshot data model: pooled read groups, regions, and history
//!
//! A [`ReadGroup`] pools the byte buffers for one contiguous remote span;
//! [`SnapshotRegion`]s are weightless views into a group; a [`Snapshot`]
//! is an ordered collection of regions; the [`SnapshotManager`] keeps the
//! undo/redo history with size-bounded retention.

pub mod builder;
pub mod element_range;
pub mod indexer;
pub mod manager;
pub mod read_group;
pub mod region;
pub mod snapshot;

pub use builder::{build_snapshot, refresh_snapshot};
pub use element_range::SnapshotElementRange;
pub use indexer::SnapshotElementIndexer;
pub use manager::{SnapshotManager, DEFAULT_RETENTION_CEILING_BYTES};
pub use read_group::{GroupValues, ReadGroup};
pub use region::SnapshotRegion;
pub use snapshot::Snapshot;
