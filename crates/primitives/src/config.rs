use crate::SystemConfig;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The default L1 block time in seconds.
pub const DEFAULT_L1_BLOCK_TIME: u64 = 12;

/// The default L2 block time in seconds.
pub const DEFAULT_L2_BLOCK_TIME: u64 = 2;

/// The default maximum size in bytes of a batch submission payload.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 120_000;

/// The default L1 fee overhead of the genesis system config.
pub const DEFAULT_GAS_OVERHEAD: u64 = 2100;

/// The default L1 fee scalar of the genesis system config.
pub const DEFAULT_GAS_SCALAR: u64 = 1_000_000;

/// The default L2 block gas limit of the genesis system config.
pub const DEFAULT_GAS_LIMIT: u64 = 30_000_000;

/// The chain level configuration of the rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupConfig {
    /// The L1 chain id.
    pub l1_chain_id: u64,
    /// The L2 chain id.
    pub l2_chain_id: u64,
    /// The timestamp shared by the L1 and L2 genesis blocks.
    pub genesis_timestamp: u64,
    /// The system config at genesis.
    pub genesis_system_config: SystemConfig,
    /// The L1 block time in seconds.
    pub l1_block_time: u64,
    /// The L2 block time in seconds.
    pub block_time: u64,
    /// The address batch submissions are sent to.
    pub batch_inbox_address: Address,
    /// The address of the system config contract on L1.
    pub system_config_address: Address,
    /// The only address allowed to update the system config.
    pub system_config_owner: Address,
    /// The timestamp from which span batches are accepted, if ever.
    pub delta_time: Option<u64>,
    /// The maximum size in bytes of a batch submission payload.
    pub max_frame_size: usize,
}

impl RollupConfig {
    /// Returns true if span batches are accepted at `timestamp`.
    pub fn is_delta_active(&self, timestamp: u64) -> bool {
        self.delta_time.is_some_and(|activation| timestamp >= activation)
    }

    /// Returns the L2 block number at `timestamp`, or [`None`] if the timestamp is before genesis
    /// or not aligned on the block time.
    pub const fn l2_block_number_at(&self, timestamp: u64) -> Option<u64> {
        if timestamp < self.genesis_timestamp || self.block_time == 0 {
            return None
        }
        let elapsed = timestamp - self.genesis_timestamp;
        if elapsed % self.block_time != 0 {
            return None
        }
        Some(elapsed / self.block_time)
    }

    /// Returns the timestamp of the L2 block `number`.
    pub const fn l2_timestamp_of(&self, number: u64) -> u64 {
        self.genesis_timestamp + number * self.block_time
    }
}

/// The wire encoding used by the batcher.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// One batch per L2 block.
    #[default]
    Singular,
    /// One batch per contiguous range of L2 blocks.
    Span,
}

impl BatchMode {
    /// All the batch modes.
    pub const ALL: [Self; 2] = [Self::Singular, Self::Span];
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singular => write!(f, "SingularBatch"),
            Self::Span => write!(f, "SpanBatch"),
        }
    }
}

impl FromStr for BatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("singular") || s.eq_ignore_ascii_case("singularbatch") {
            Ok(Self::Singular)
        } else if s.eq_ignore_ascii_case("span") || s.eq_ignore_ascii_case("spanbatch") {
            Ok(Self::Span)
        } else {
            Err(format!("Expected 'singular' or 'span', got '{s}'"))
        }
    }
}
