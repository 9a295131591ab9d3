//! Constraint-driven scanning over memory snapshots
//!
//! The pipeline: a [`constraints::ScanConstraints`] tree is compiled once
//! per scan into closures ([`comparers`]), a strategy is selected per
//! element range ([`scanners`]), per-element results are coalesced by the
//! run-length [`encoder`], and the [`dispatcher`] fans shards out across
//! worker threads.

pub mod comparers;
pub mod constraints;
pub mod dispatcher;
pub mod encoder;
pub mod mask;
pub mod primitives;
pub mod scanners;

pub use comparers::{compile_scalar, compile_vector, CompiledComparers, CompiledPattern};
pub use constraints::{
    Constraint, ConstraintKind, ConstraintOperator, MemoryAlignment, OperationConstraint,
    ScanConstraint, ScanConstraints,
};
pub use dispatcher::{scan_snapshot, scan_snapshot_with, DEFAULT_SHARD_SIZE};
pub use encoder::{ByteRange, RunLengthEncoder};
pub use mask::BoolMask16;
pub use scanners::{scan_element_range, ScanStrategy};
