use crate::SetupError;

use alloy_primitives::{address, Address};
use harness_primitives::{
    RollupConfig, SystemConfig, DEFAULT_GAS_LIMIT, DEFAULT_GAS_OVERHEAD, DEFAULT_GAS_SCALAR,
    DEFAULT_L1_BLOCK_TIME, DEFAULT_L2_BLOCK_TIME, DEFAULT_MAX_FRAME_SIZE,
};
use harness_signer::Credential;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The default L1 chain id.
pub const DEFAULT_L1_CHAIN_ID: u64 = 900;

/// The default L2 chain id.
pub const DEFAULT_L2_CHAIN_ID: u64 = 901;

/// The default genesis timestamp.
pub const DEFAULT_GENESIS_TIMESTAMP: u64 = 1_700_000_000;

/// The default batch inbox address.
pub const DEFAULT_BATCH_INBOX_ADDRESS: Address =
    address!("0xff00000000000000000000000000000000000901");

/// The default system config contract address.
pub const DEFAULT_SYSTEM_CONFIG_ADDRESS: Address =
    address!("0x5c00000000000000000000000000000000000001");

/// The default seed of the actor keys.
pub const DEFAULT_SEED: &str = "harness";

/// The deploy configuration, loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeployConfig {
    /// The L1 chain id.
    #[serde(rename = "l1ChainID")]
    pub l1_chain_id: u64,
    /// The L2 chain id.
    #[serde(rename = "l2ChainID")]
    pub l2_chain_id: u64,
    /// The timestamp of the L1 and L2 genesis blocks.
    pub genesis_timestamp: u64,
    /// The L1 block time in seconds.
    pub l1_block_time: u64,
    /// The L2 block time in seconds.
    pub l2_block_time: u64,
    /// The batch inbox address.
    pub batch_inbox_address: Address,
    /// The system config contract address.
    pub system_config_address: Address,
    /// The maximum size of a batch submission payload.
    pub max_frame_size: usize,
    /// The L1 fee overhead at genesis.
    pub gas_price_oracle_overhead: u64,
    /// The L1 fee scalar at genesis.
    pub gas_price_oracle_scalar: u64,
    /// The L2 block gas limit at genesis.
    pub l2_genesis_block_gas_limit: u64,
    /// The offset from genesis at which span batches are accepted, never if unset.
    pub l2_genesis_delta_time_offset: Option<u64>,
    /// The seed of the actor keys.
    pub seed: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            l1_chain_id: DEFAULT_L1_CHAIN_ID,
            l2_chain_id: DEFAULT_L2_CHAIN_ID,
            genesis_timestamp: DEFAULT_GENESIS_TIMESTAMP,
            l1_block_time: DEFAULT_L1_BLOCK_TIME,
            l2_block_time: DEFAULT_L2_BLOCK_TIME,
            batch_inbox_address: DEFAULT_BATCH_INBOX_ADDRESS,
            system_config_address: DEFAULT_SYSTEM_CONFIG_ADDRESS,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            gas_price_oracle_overhead: DEFAULT_GAS_OVERHEAD,
            gas_price_oracle_scalar: DEFAULT_GAS_SCALAR,
            l2_genesis_block_gas_limit: DEFAULT_GAS_LIMIT,
            l2_genesis_delta_time_offset: None,
            seed: DEFAULT_SEED.to_string(),
        }
    }
}

impl DeployConfig {
    /// Reads the [`DeployConfig`] from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| SetupError::Read { path: path.to_path_buf(), source })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Sets the span batch activation offset.
    pub fn apply_delta_time_offset(&mut self, offset: Option<u64>) {
        self.l2_genesis_delta_time_offset = offset;
    }

    /// Checks the configuration is consistent.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.l1_block_time == 0 || self.l2_block_time == 0 {
            return Err(SetupError::ZeroBlockTime)
        }
        if self.l2_block_time > self.l1_block_time {
            return Err(SetupError::L2BlockTimeExceedsL1 {
                l2: self.l2_block_time,
                l1: self.l1_block_time,
            })
        }
        if self.max_frame_size == 0 {
            return Err(SetupError::ZeroFrameSize)
        }
        if self.l1_chain_id == self.l2_chain_id {
            return Err(SetupError::EqualChainIds(self.l1_chain_id))
        }
        if self.batch_inbox_address == self.system_config_address {
            return Err(SetupError::InboxIsSystemConfig(self.batch_inbox_address))
        }
        Ok(())
    }
}

/// The named actors of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum Actor {
    /// The genesis batcher.
    #[display("alice")]
    Alice,
    /// The second batcher.
    #[display("bob")]
    Bob,
    /// An actor never authorized for anything.
    #[display("mallory")]
    Mallory,
    /// The owner of the system config.
    #[display("sys-cfg-owner")]
    SysCfgOwner,
}

impl Actor {
    /// All the actors.
    pub const ALL: [Self; 4] = [Self::Alice, Self::Bob, Self::Mallory, Self::SysCfgOwner];
}

/// The credentials of the actors, derived from a seed.
#[derive(Debug, Clone)]
pub struct Secrets {
    alice: Credential,
    bob: Credential,
    mallory: Credential,
    sys_cfg_owner: Credential,
}

impl Secrets {
    /// Derives the credentials of every [`Actor`] from the seed.
    pub fn from_seed(seed: &str) -> Result<Self, SetupError> {
        let derive = |actor: Actor| Credential::from_seed(seed, actor.to_string());
        Ok(Self {
            alice: derive(Actor::Alice)?,
            bob: derive(Actor::Bob)?,
            mallory: derive(Actor::Mallory)?,
            sys_cfg_owner: derive(Actor::SysCfgOwner)?,
        })
    }

    /// Returns the credential of the actor.
    pub const fn credential(&self, actor: Actor) -> &Credential {
        match actor {
            Actor::Alice => &self.alice,
            Actor::Bob => &self.bob,
            Actor::Mallory => &self.mallory,
            Actor::SysCfgOwner => &self.sys_cfg_owner,
        }
    }

    /// Returns the address of the actor.
    pub fn address(&self, actor: Actor) -> Address {
        self.credential(actor).address()
    }
}

/// The validated deploy parameters of a scenario.
#[derive(Debug, Clone)]
pub struct DeployParams {
    config: DeployConfig,
    secrets: Secrets,
}

impl DeployParams {
    /// Validates the configuration and derives the actor credentials.
    pub fn new(config: DeployConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let secrets = Secrets::from_seed(&config.seed)?;
        Ok(Self { config, secrets })
    }

    /// Reads, validates and derives the parameters of the JSON deploy configuration at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        Self::new(DeployConfig::from_file(path)?)
    }

    /// Checks the deploy configuration is consistent.
    pub fn validate(&self) -> Result<(), SetupError> {
        self.config.validate()
    }

    /// Returns the deploy configuration.
    pub const fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Returns the actor credentials.
    pub const fn secrets(&self) -> &Secrets {
        &self.secrets
    }

    /// Returns a copy of the parameters with the span batch activation offset set.
    pub fn with_delta_time_offset(&self, offset: Option<u64>) -> Self {
        let mut params = self.clone();
        params.config.apply_delta_time_offset(offset);
        params
    }

    /// Returns the [`RollupConfig`] of the deployment. Alice is the genesis batcher.
    pub fn rollup_config(&self) -> RollupConfig {
        let config = &self.config;
        RollupConfig {
            l1_chain_id: config.l1_chain_id,
            l2_chain_id: config.l2_chain_id,
            genesis_timestamp: config.genesis_timestamp,
            genesis_system_config: SystemConfig::new(
                self.secrets.address(Actor::Alice),
                config.gas_price_oracle_overhead,
                config.gas_price_oracle_scalar,
                config.l2_genesis_block_gas_limit,
            ),
            l1_block_time: config.l1_block_time,
            block_time: config.l2_block_time,
            batch_inbox_address: config.batch_inbox_address,
            system_config_address: config.system_config_address,
            system_config_owner: self.secrets.address(Actor::SysCfgOwner),
            delta_time: config
                .l2_genesis_delta_time_offset
                .map(|offset| config.genesis_timestamp + offset),
            max_frame_size: config.max_frame_size,
        }
    }
}
