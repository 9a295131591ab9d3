//! Snapshot scanning core for live process-memory inspection
//!
//! Given periodic snapshots of a foreign process's address space, this
//! crate finds every byte offset whose value satisfies a user predicate
//! (exact value, relative change, range, or byte pattern with wildcards)
//! across the scannable primitive types and memory alignments, and
//! run-length encodes contiguous matches into new snapshot regions.
//!
//! The OS-specific process layer is out of scope: reading, writing,
//! querying, and allocating foreign-process memory happen behind the
//! narrow contracts in [`interfaces`].

pub mod config;
pub mod core;
pub mod interfaces;
pub mod scanning;
pub mod snapshots;

// Re-export main types from the core module
pub use crate::core::types::{
    Address, BytePattern, MemoryError, MemoryResult, MemoryValue, ValueType,
};
pub use crate::core::VECTOR_WIDTH;

pub use interfaces::{MemoryAllocator, MemoryQueryer, MemoryReader, MemoryWriter, PointerWidth};
pub use scanning::{
    scan_snapshot, scan_snapshot_with, Constraint, ConstraintKind, ConstraintOperator,
    MemoryAlignment, ScanConstraints,
};
pub use snapshots::{
    build_snapshot, refresh_snapshot, ReadGroup, Snapshot, SnapshotElementIndexer,
    SnapshotElementRange, SnapshotManager, SnapshotRegion,
};
