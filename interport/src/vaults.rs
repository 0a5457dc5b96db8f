//! Scan configuration: tracked vaults, history start and exempt addresses.
//!
//! All of it is passed explicitly into the scanner so that fixtures can
//! drive it without any process-wide state.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::scanner::SubRanges;
use crate::types::VaultConfig;

/// Maximum number of blocks (inclusive) a single log query may span.
///
/// The upstream `eth_getLogs` endpoint rejects wider ranges.
pub const MAX_BLOCK_SPAN: u64 = 800;

/// How consecutive sub-ranges of a history walk are joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeChaining {
    /// Next sub-range starts one block after the previous end.
    #[default]
    Exclusive,
    /// Next sub-range starts at the previous end block, re-querying it.
    ///
    /// Transfers included exactly at a boundary block are reported twice.
    /// Only useful to reproduce exports made by the legacy adapter.
    Overlapping,
}

/// Everything the scanner needs besides the chain-data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Vaults in export order.
    pub vaults: Vec<VaultConfig>,
    /// First block of every history walk (inclusive).
    pub search_start_block: u64,
    /// Stablecoin farm address; its transfers are protocol-internal.
    pub farm_address: Address,
    /// Sub-range joining strategy.
    pub chaining: RangeChaining,
}

impl ScanConfig {
    /// Create a configuration with [`RangeChaining::Exclusive`] chaining.
    #[must_use]
    pub const fn new(
        vaults: Vec<VaultConfig>,
        search_start_block: u64,
        farm_address: Address,
    ) -> Self {
        Self {
            vaults,
            search_start_block,
            farm_address,
            chaining: RangeChaining::Exclusive,
        }
    }

    /// Override the sub-range chaining strategy.
    #[must_use]
    pub fn with_chaining(mut self, chaining: RangeChaining) -> Self {
        self.chaining = chaining;
        self
    }

    /// Whether `address` never receives a row: the farm or the zero address.
    #[must_use]
    pub fn is_exempt(&self, address: Address) -> bool {
        address == self.farm_address || address == Address::ZERO
    }

    /// Sub-ranges covering this configuration's history up to `target`.
    #[must_use]
    pub const fn sub_ranges(&self, target: u64) -> SubRanges {
        SubRanges::new(self.search_start_block, target, self.chaining)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    const FARM: Address = address!("00000000000000000000000000000000000000fa");

    #[test]
    fn exempt_addresses() {
        let config = ScanConfig::new(Vec::new(), 0, FARM);
        assert!(config.is_exempt(FARM), "farm is exempt");
        assert!(config.is_exempt(Address::ZERO), "zero address is exempt");
        assert!(
            !config.is_exempt(address!("00000000000000000000000000000000000000fb")),
            "ordinary user is not exempt"
        );
    }

    #[test]
    fn chaining_defaults_to_exclusive() {
        assert_eq!(RangeChaining::default(), RangeChaining::Exclusive);
        let config = ScanConfig::new(Vec::new(), 0, FARM).with_chaining(RangeChaining::Overlapping);
        assert_eq!(config.chaining, RangeChaining::Overlapping);
    }
}
