//! Virtual-memory query contract and region filtering
//!
//! The core asks the OS layer for the regions worth snapshotting; the
//! filter model (required/excluded protection, allowed region kinds,
//! address range) is evaluated here so every queryer implementation
//! shares one filtering semantics.

use crate::core::types::{Address, MemoryResult};
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Pointer width of the target process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerWidth {
    Bits32,
    Bits64,
}

impl PointerWidth {
    /// Pointer size in bytes
    pub const fn size(&self) -> usize {
        match self {
            PointerWidth::Bits32 => 4,
            PointerWidth::Bits64 => 8,
        }
    }
}

/// Portable page-protection flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProtectionFlags(u32);

impl ProtectionFlags {
    pub const NONE: ProtectionFlags = ProtectionFlags(0);
    pub const READ: ProtectionFlags = ProtectionFlags(1 << 0);
    pub const WRITE: ProtectionFlags = ProtectionFlags(1 << 1);
    pub const EXECUTE: ProtectionFlags = ProtectionFlags(1 << 2);
    pub const GUARD: ProtectionFlags = ProtectionFlags(1 << 3);

    /// Checks whether all of `other`'s flags are present
    pub const fn contains(&self, other: ProtectionFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Checks whether any of `other`'s flags are present
    pub const fn intersects(&self, other: ProtectionFlags) -> bool {
        self.0 & other.0 != 0
    }

    /// Checks whether no flags are set
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ProtectionFlags {
    type Output = ProtectionFlags;
    fn bitor(self, rhs: Self) -> Self {
        ProtectionFlags(self.0 | rhs.0)
    }
}

/// Kind of a memory region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Private memory (heaps, stacks)
    Private,
    /// Mapped memory (file mappings)
    Mapped,
    /// Image memory (executables and libraries)
    Image,
}

/// Information about one committed memory region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub base_address: Address,
    pub size: usize,
    pub protection: ProtectionFlags,
    pub kind: RegionKind,
}

impl RegionInfo {
    /// End address (exclusive)
    pub fn end_address(&self) -> Address {
        self.base_address.offset(self.size as i64)
    }

    /// Checks readability
    pub fn is_readable(&self) -> bool {
        self.protection.contains(ProtectionFlags::READ)
    }

    /// Checks writability
    pub fn is_writable(&self) -> bool {
        self.protection.contains(ProtectionFlags::WRITE)
    }

    /// Checks executability
    pub fn is_executable(&self) -> bool {
        self.protection.contains(ProtectionFlags::EXECUTE)
    }

    /// Checks the guard-page flag
    pub fn is_guarded(&self) -> bool {
        self.protection.contains(ProtectionFlags::GUARD)
    }
}

/// Information about a loaded module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub name: String,
    pub base_address: Address,
    pub size: usize,
}

impl ModuleInfo {
    /// Creates module info
    pub fn new(name: impl Into<String>, base_address: Address, size: usize) -> Self {
        ModuleInfo {
            name: name.into(),
            base_address,
            size,
        }
    }

    /// Checks whether an address falls inside the module
    pub fn contains_address(&self, address: Address) -> bool {
        address >= self.base_address && address < self.base_address.offset(self.size as i64)
    }
}

/// Address translation applied before regions are consumed
///
/// `EmulatedGuest` covers targets where a console emulator maps guest RAM
/// into the host process. The implementor's detection contract: candidate
/// host regions are identified by a fixed region size (32 MiB for main
/// RAM, 64 MiB for the extended case), backed by physical memory, and —
/// for main RAM — carrying a 6-byte ASCII game identifier at the region
/// start as a sanity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressTranslation {
    #[default]
    Native,
    EmulatedGuest,
}

/// Criteria for filtering enumerated memory regions
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Flags a region must carry
    pub required_protection: ProtectionFlags,
    /// Flags a region must not carry
    pub excluded_protection: ProtectionFlags,
    /// Region kinds to include; `None` includes all
    pub allowed_kinds: Option<Vec<RegionKind>>,
    /// Restrict to regions fully inside this range
    pub address_range: Option<(Address, Address)>,
    /// Filter by minimum size
    pub min_size: Option<usize>,
    /// Filter by maximum size
    pub max_size: Option<usize>,
}

impl FilterCriteria {
    /// Creates a new filter criteria builder
    pub fn new() -> Self {
        FilterCriteria::default()
    }

    /// Requires all the given protection flags
    pub fn with_required_protection(mut self, flags: ProtectionFlags) -> Self {
        self.required_protection = self.required_protection | flags;
        self
    }

    /// Excludes regions carrying any of the given flags
    pub fn with_excluded_protection(mut self, flags: ProtectionFlags) -> Self {
        self.excluded_protection = self.excluded_protection | flags;
        self
    }

    /// Restricts to the given region kinds
    pub fn with_allowed_kinds(mut self, kinds: Vec<RegionKind>) -> Self {
        self.allowed_kinds = Some(kinds);
        self
    }

    /// Restricts to regions fully inside `[start, end)`
    pub fn with_address_range(mut self, start: Address, end: Address) -> Self {
        self.address_range = Some((start, end));
        self
    }

    /// Sets a minimum region size
    pub fn with_min_size(mut self, size: usize) -> Self {
        self.min_size = Some(size);
        self
    }

    /// Sets a maximum region size
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = Some(size);
        self
    }
}

/// Filter applying [`FilterCriteria`] to enumerated regions
pub struct RegionFilter {
    criteria: FilterCriteria,
}

impl RegionFilter {
    /// Creates a filter with the given criteria
    pub fn new(criteria: FilterCriteria) -> Self {
        RegionFilter { criteria }
    }

    /// Applies the filter to a list of regions
    pub fn apply(&self, regions: &[RegionInfo]) -> Vec<RegionInfo> {
        regions
            .iter()
            .filter(|region| self.matches(region))
            .cloned()
            .collect()
    }

    /// Checks if a region matches the criteria
    pub fn matches(&self, region: &RegionInfo) -> bool {
        if !region.protection.contains(self.criteria.required_protection) {
            return false;
        }

        if region.protection.intersects(self.criteria.excluded_protection) {
            return false;
        }

        if let Some(kinds) = &self.criteria.allowed_kinds {
            if !kinds.contains(&region.kind) {
                return false;
            }
        }

        if let Some((start, end)) = self.criteria.address_range {
            if region.base_address < start || region.end_address() > end {
                return false;
            }
        }

        if let Some(min) = self.criteria.min_size {
            if region.size < min {
                return false;
            }
        }

        if let Some(max) = self.criteria.max_size {
            if region.size > max {
                return false;
            }
        }

        true
    }

    /// Counts regions matching the filter
    pub fn count(&self, regions: &[RegionInfo]) -> usize {
        regions.iter().filter(|region| self.matches(region)).count()
    }

    /// Total size of regions matching the filter
    pub fn total_size(&self, regions: &[RegionInfo]) -> usize {
        regions
            .iter()
            .filter(|region| self.matches(region))
            .map(|region| region.size)
            .sum()
    }
}

/// Lowest usermode address handed out by default
pub const MIN_USERMODE_ADDRESS: u64 = 0x10000;
/// Highest usermode address for 32-bit targets
pub const MAX_USERMODE_ADDRESS_32: u64 = 0x7FFE_FFFF;
/// Highest usermode address for 64-bit targets
pub const MAX_USERMODE_ADDRESS_64: u64 = 0x7FFF_FFFF_FFFF;

/// Enumerates and resolves the target's virtual memory layout
pub trait MemoryQueryer: Send + Sync {
    /// Enumerates committed regions matching the filter
    fn query_regions(&self, criteria: &FilterCriteria) -> MemoryResult<Vec<RegionInfo>>;

    /// Queries the region containing an address
    fn region_at(&self, address: Address) -> MemoryResult<RegionInfo>;

    /// Resolves a module's base address by name
    fn module_base(&self, module_name: &str) -> MemoryResult<Address>;

    /// Maps an address back to its containing module, if any
    fn module_containing(&self, address: Address) -> MemoryResult<Option<ModuleInfo>>;

    /// Usermode address bounds for the target's pointer width
    fn address_bounds(&self, width: PointerWidth) -> (Address, Address) {
        let max = match width {
            PointerWidth::Bits32 => MAX_USERMODE_ADDRESS_32,
            PointerWidth::Bits64 => MAX_USERMODE_ADDRESS_64,
        };
        (Address::new(MIN_USERMODE_ADDRESS), Address::new(max))
    }

    /// The active address translation mode
    fn translation_mode(&self) -> AddressTranslation {
        AddressTranslation::Native
    }

    /// Translates a (possibly emulator-mapped) address to a host address
    fn translate_address(&self, address: Address) -> MemoryResult<Address> {
        Ok(address)
    }
}
