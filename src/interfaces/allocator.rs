//! Remote-memory allocation contract and the near-hint retry helper

use super::queryer::RegionInfo;
use crate::core::types::{Address, MemoryResult};
use rand::Rng;
use tracing::debug;

/// Allocation granularity used when chunking free regions into candidates
pub const ALLOCATION_GRANULARITY: usize = 64 * 1024;
/// Search window around a near-allocation hint
pub const NEAR_ALLOCATION_WINDOW: u64 = 1 << 30;
/// Bounded retries before falling back to allocating anywhere
pub const NEAR_ALLOCATION_RETRIES: usize = 4;

/// Allocates and frees memory inside a target process
pub trait MemoryAllocator: Send + Sync {
    /// Allocates `size` bytes anywhere in the target
    fn allocate(&self, size: usize) -> MemoryResult<Address>;

    /// Allocates `size` bytes at a specific address
    fn allocate_at(&self, address: Address, size: usize) -> MemoryResult<Address>;

    /// Frees a previous allocation
    fn free(&self, address: Address) -> MemoryResult<()>;

    /// Enumerates unallocated regions within `[start, end)`
    fn query_free_regions(&self, start: Address, end: Address) -> MemoryResult<Vec<RegionInfo>>;
}

/// Allocates near a hint address (e.g. within near-jump range of a hook)
///
/// Free regions within roughly ±1 GiB of the hint are chunked into
/// allocation-granularity candidates and one is sampled at random from
/// the injected source. Because the free-region query may be stale by
/// allocation time, a failed attempt re-queries and retries a bounded
/// number of times before falling back to allocating anywhere.
pub fn allocate_near<R: Rng + ?Sized>(
    allocator: &dyn MemoryAllocator,
    hint: Address,
    size: usize,
    rng: &mut R,
) -> MemoryResult<Address> {
    let window_start = Address::new(hint.as_u64().saturating_sub(NEAR_ALLOCATION_WINDOW));
    let window_end = Address::new(hint.as_u64().saturating_add(NEAR_ALLOCATION_WINDOW));

    for attempt in 0..NEAR_ALLOCATION_RETRIES {
        let free_regions = allocator.query_free_regions(window_start, window_end)?;
        let candidates = granularity_candidates(&free_regions, size);
        if candidates.is_empty() {
            break;
        }

        let choice = candidates[rng.gen_range(0..candidates.len())];
        match allocator.allocate_at(choice, size) {
            Ok(address) => return Ok(address),
            Err(error) => {
                debug!(attempt, candidate = %choice, %error, "near-allocation candidate lost, retrying");
            }
        }
    }

    allocator.allocate(size)
}

/// Chunks free regions into granularity-aligned candidate base addresses
fn granularity_candidates(free_regions: &[RegionInfo], size: usize) -> Vec<Address> {
    let mut candidates = Vec::new();
    for region in free_regions {
        let first = region
            .base_address
            .align_up(ALLOCATION_GRANULARITY as u64)
            .as_u64();
        let end = region.end_address().as_u64();
        let mut base = first;
        while base + size as u64 <= end {
            candidates.push(Address::new(base));
            base += ALLOCATION_GRANULARITY as u64;
        }
    }
    candidates
}
