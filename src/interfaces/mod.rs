//! Capability contracts the core consumes from the OS/process layer
//!
//! The scanning core never touches a foreign process directly; it calls
//! through these narrow traits. Implementations (Windows, Linux, emulator
//! bridges) live outside this crate.

pub mod allocator;
pub mod queryer;
pub mod reader;
pub mod writer;

pub use allocator::{
    allocate_near, MemoryAllocator, ALLOCATION_GRANULARITY, NEAR_ALLOCATION_RETRIES,
    NEAR_ALLOCATION_WINDOW,
};
pub use queryer::{
    AddressTranslation, FilterCriteria, MemoryQueryer, ModuleInfo, PointerWidth, ProtectionFlags,
    RegionFilter, RegionInfo, RegionKind,
};
pub use reader::MemoryReader;
pub use writer::MemoryWriter;
