//! Parallel scan orchestration across a snapshot's regions
//!
//! Scanning is embarrassingly parallel: every shard is processed
//! independently against read-only buffers and produces disjoint output
//! ranges. Regions are scheduled largest-first and sharded to a multiple
//! of the vector width so no two workers ever meet inside one vector.

use super::comparers::CompiledComparers;
use super::constraints::ScanConstraints;
use super::scanners::scan_element_range;
use crate::core::types::{MemoryError, MemoryResult};
use crate::snapshots::{Snapshot, SnapshotRegion};
use rayon::prelude::*;
use tracing::debug;

/// Default shard size handed to one worker at a time
pub const DEFAULT_SHARD_SIZE: usize = 1 << 20;

/// Scans a snapshot with the default shard size
pub fn scan_snapshot(
    snapshot: &Snapshot,
    constraints: &ScanConstraints,
) -> MemoryResult<Snapshot> {
    scan_snapshot_with(snapshot, constraints, DEFAULT_SHARD_SIZE)
}

/// Scans a snapshot, returning a new snapshot of the matching ranges
///
/// The result's regions reference the same read groups as the input; no
/// bytes are copied. Relative constraints are rejected outright when any
/// referenced group lacks previous values (callers should consult
/// `ReadGroup::can_compare` first).
pub fn scan_snapshot_with(
    snapshot: &Snapshot,
    constraints: &ScanConstraints,
    shard_size: usize,
) -> MemoryResult<Snapshot> {
    constraints.validate()?;

    if constraints.is_relative() {
        for group in snapshot.distinct_read_groups() {
            if !group.can_compare() {
                return Err(MemoryError::previous_values_unavailable(
                    group.base_address(),
                ));
            }
        }
    }

    // Compile the constraint tree once for the whole scan; the closures
    // are shared read-only across workers.
    let comparers = CompiledComparers::compile(constraints)?;

    let mut shards = Vec::new();
    for index in snapshot.optimized_region_order() {
        shards.extend(snapshot.regions()[index].shard(shard_size));
    }

    debug!(
        regions = snapshot.region_count(),
        shards = shards.len(),
        bytes = snapshot.byte_count(),
        "dispatching scan"
    );

    let results: MemoryResult<Vec<Vec<SnapshotRegion>>> = shards
        .par_iter()
        .map(|shard| {
            let ranges = scan_element_range(&shard.element_range(), constraints, &comparers)?;
            Ok(ranges
                .into_iter()
                .map(|range| {
                    SnapshotRegion::new(shard.read_group().clone(), range.offset, range.size)
                })
                .collect())
        })
        .collect();

    let regions: Vec<SnapshotRegion> = results?.into_iter().flatten().collect();
    debug!(matches = regions.len(), "scan complete");

    Ok(Snapshot::new(snapshot.name(), regions))
}
