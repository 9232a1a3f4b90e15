//! Primitive types shared by the derivation harness crates.

pub use block::{BlockInfo, L1Block, L2Block, L2BlockHeader};
mod block;

pub use config::{
    BatchMode, RollupConfig, DEFAULT_GAS_LIMIT, DEFAULT_GAS_OVERHEAD, DEFAULT_GAS_SCALAR,
    DEFAULT_L1_BLOCK_TIME, DEFAULT_L2_BLOCK_TIME, DEFAULT_MAX_FRAME_SIZE,
};
mod config;

pub use system_config::{address_as_left_padded_hash, SystemConfig};
mod system_config;

pub use transaction::{L1Transaction, TxRequest};
mod transaction;
