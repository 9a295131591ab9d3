//! Building and refreshing snapshots through the external contracts

use super::read_group::ReadGroup;
use super::region::SnapshotRegion;
use super::snapshot::Snapshot;
use crate::core::types::MemoryResult;
use crate::interfaces::{FilterCriteria, MemoryQueryer, MemoryReader};
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds a snapshot by enumerating regions and reading their bytes
///
/// One read group is created per enumerated region. A region whose read
/// fails carries no data this cycle and is skipped with a warning; the
/// failure never aborts the snapshot.
pub fn build_snapshot(
    queryer: &dyn MemoryQueryer,
    reader: &dyn MemoryReader,
    criteria: &FilterCriteria,
    name: impl Into<String>,
) -> MemoryResult<Snapshot> {
    let region_infos = queryer.query_regions(criteria)?;
    let mut regions = Vec::with_capacity(region_infos.len());

    for info in region_infos {
        let mut buffer = vec![0u8; info.size];
        match reader.read_bytes(info.base_address, &mut buffer) {
            Ok(()) => {
                let group = Arc::new(ReadGroup::with_values(info.base_address, buffer));
                regions.push(SnapshotRegion::from_group(group));
            }
            Err(error) => {
                warn!(address = %info.base_address, size = info.size, %error,
                    "region read failed, skipping this cycle");
            }
        }
    }

    debug!(regions = regions.len(), "snapshot built");
    Ok(Snapshot::new(name, regions))
}

/// Re-reads every distinct group, rotating current values into previous
///
/// Returns the number of groups refreshed. A failed read leaves the
/// group's buffers untouched so prior snapshot state is never corrupted.
pub fn refresh_snapshot(snapshot: &Snapshot, reader: &dyn MemoryReader) -> MemoryResult<usize> {
    let mut refreshed = 0;

    for group in snapshot.distinct_read_groups() {
        let mut buffer = vec![0u8; group.region_size()];
        match reader.read_bytes(group.base_address(), &mut buffer) {
            Ok(()) => {
                group.set_current_values(buffer)?;
                refreshed += 1;
            }
            Err(error) => {
                warn!(address = %group.base_address(), %error,
                    "group refresh failed, keeping prior values");
            }
        }
    }

    debug!(refreshed, "snapshot refreshed");
    Ok(refreshed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Address, MemoryError};
    use crate::interfaces::{ProtectionFlags, RegionInfo, RegionKind};

    struct FakeQueryer {
        regions: Vec<RegionInfo>,
    }

    impl MemoryQueryer for FakeQueryer {
        fn query_regions(&self, _criteria: &FilterCriteria) -> MemoryResult<Vec<RegionInfo>> {
            Ok(self.regions.clone())
        }

        fn region_at(&self, address: Address) -> MemoryResult<RegionInfo> {
            self.regions
                .iter()
                .find(|region| {
                    address >= region.base_address && address < region.end_address()
                })
                .cloned()
                .ok_or_else(|| MemoryError::QueryFailed("no region".to_string()))
        }

        fn module_base(&self, module_name: &str) -> MemoryResult<Address> {
            Err(MemoryError::ModuleNotFound(module_name.to_string()))
        }

        fn module_containing(
            &self,
            _address: Address,
        ) -> MemoryResult<Option<crate::interfaces::ModuleInfo>> {
            Ok(None)
        }
    }

    /// Reader that fills buffers with a constant and fails on one address
    struct FakeReader {
        fill: u8,
        failing: Option<u64>,
    }

    impl MemoryReader for FakeReader {
        fn read_bytes(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
            if Some(address.as_u64()) == self.failing {
                return Err(MemoryError::read_failed(address, "page gone"));
            }
            buffer.fill(self.fill);
            Ok(())
        }
    }

    fn region_info(base: u64, size: usize) -> RegionInfo {
        RegionInfo {
            base_address: Address::new(base),
            size,
            protection: ProtectionFlags::READ | ProtectionFlags::WRITE,
            kind: RegionKind::Private,
        }
    }

    #[test]
    fn test_build_snapshot() {
        let queryer = FakeQueryer {
            regions: vec![region_info(0x1000, 64), region_info(0x3000, 32)],
        };
        let reader = FakeReader {
            fill: 0xAB,
            failing: None,
        };
        let snapshot =
            build_snapshot(&queryer, &reader, &FilterCriteria::new(), "initial").unwrap();
        assert_eq!(snapshot.region_count(), 2);
        assert_eq!(snapshot.byte_count(), 96);

        let values = snapshot.regions()[0].read_group().values();
        assert_eq!(values.current().unwrap()[0], 0xAB);
    }

    #[test]
    fn test_failed_region_is_skipped_not_fatal() {
        let queryer = FakeQueryer {
            regions: vec![region_info(0x1000, 64), region_info(0x3000, 32)],
        };
        let reader = FakeReader {
            fill: 0xAB,
            failing: Some(0x1000),
        };
        let snapshot =
            build_snapshot(&queryer, &reader, &FilterCriteria::new(), "partial").unwrap();
        assert_eq!(snapshot.region_count(), 1);
        assert_eq!(snapshot.regions()[0].base_address(), Address::new(0x3000));
    }

    #[test]
    fn test_refresh_rotates_buffers() {
        let queryer = FakeQueryer {
            regions: vec![region_info(0x1000, 16)],
        };
        let first = FakeReader {
            fill: 0x01,
            failing: None,
        };
        let snapshot = build_snapshot(&queryer, &first, &FilterCriteria::new(), "live").unwrap();
        assert!(!snapshot.regions()[0].can_compare());

        let second = FakeReader {
            fill: 0x02,
            failing: None,
        };
        let refreshed = refresh_snapshot(&snapshot, &second).unwrap();
        assert_eq!(refreshed, 1);

        let group = snapshot.regions()[0].read_group();
        assert!(group.can_compare());
        let values = group.values();
        assert_eq!(values.current().unwrap()[0], 0x02);
        assert_eq!(values.previous().unwrap()[0], 0x01);
    }

    #[test]
    fn test_failed_refresh_keeps_prior_values() {
        let queryer = FakeQueryer {
            regions: vec![region_info(0x1000, 16)],
        };
        let first = FakeReader {
            fill: 0x01,
            failing: None,
        };
        let snapshot = build_snapshot(&queryer, &first, &FilterCriteria::new(), "live").unwrap();

        let failing = FakeReader {
            fill: 0x02,
            failing: Some(0x1000),
        };
        let refreshed = refresh_snapshot(&snapshot, &failing).unwrap();
        assert_eq!(refreshed, 0);

        let values = snapshot.regions()[0].read_group().values();
        assert_eq!(values.current().unwrap()[0], 0x01);
        assert!(values.previous().is_none());
    }

    #[test]
    fn test_sharded_snapshot_refreshes_each_group_once() {
        let group = Arc::new(ReadGroup::with_values(Address::new(0x1000), vec![0u8; 64]));
        let snapshot = Snapshot::new(
            "sharded",
            vec![
                SnapshotRegion::new(group.clone(), 0, 32),
                SnapshotRegion::new(group.clone(), 32, 32),
            ],
        );
        let reader = FakeReader {
            fill: 0x05,
            failing: None,
        };
        let refreshed = refresh_snapshot(&snapshot, &reader).unwrap();
        assert_eq!(refreshed, 1);
        assert!(group.can_compare());
    }
}
