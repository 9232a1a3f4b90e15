use crate::{
    abi::{setBatcherHashCall, setGasLimitCall, SystemConfigCall},
    L1Chain, SystemConfigError,
};

use alloy_primitives::{Address, B256};
use harness_primitives::{address_as_left_padded_hash, RollupConfig, TxRequest};
use harness_signer::Credential;

/// Builds, signs and queues updates to the L1 system config contract.
///
/// The updates are only queued: they take effect at the height of the L1 block including them.
#[derive(Debug, Clone)]
pub struct SystemConfigMutator {
    /// The address of the system config contract.
    contract: Address,
    /// The owner of the contract.
    owner: Address,
    /// The L1 chain id.
    chain_id: u64,
}

impl SystemConfigMutator {
    /// Returns a new [`SystemConfigMutator`] for the contract described by the config.
    pub const fn new(config: &RollupConfig) -> Self {
        Self {
            contract: config.system_config_address,
            owner: config.system_config_owner,
            chain_id: config.l1_chain_id,
        }
    }

    /// Queues a transaction authorizing `new_credential` as the batcher.
    pub fn set_batcher_credential(
        &self,
        l1: &mut L1Chain,
        owner: &Credential,
        new_credential: &Credential,
    ) -> Result<B256, SystemConfigError> {
        tracing::info!(target: "harness::l1", owner = %owner.name(), batcher = %new_credential.name(), "setting batcher");
        let call = setBatcherHashCall {
            batcherHash: address_as_left_padded_hash(new_credential.address()),
        };
        self.submit(l1, owner, call.into())
    }

    /// Queues a transaction updating the L1 fee parameters.
    pub fn set_gas_config(
        &self,
        l1: &mut L1Chain,
        owner: &Credential,
        overhead: u64,
        scalar: u64,
    ) -> Result<B256, SystemConfigError> {
        tracing::info!(target: "harness::l1", owner = %owner.name(), overhead, scalar, "setting gas config");
        self.submit(l1, owner, SystemConfigCall::gas_config(overhead, scalar))
    }

    /// Queues a transaction updating the L2 block gas limit.
    pub fn set_gas_limit(
        &self,
        l1: &mut L1Chain,
        owner: &Credential,
        gas_limit: u64,
    ) -> Result<B256, SystemConfigError> {
        tracing::info!(target: "harness::l1", owner = %owner.name(), gas_limit, "setting gas limit");
        self.submit(l1, owner, setGasLimitCall { gasLimit: gas_limit }.into())
    }

    fn submit(
        &self,
        l1: &mut L1Chain,
        owner: &Credential,
        call: SystemConfigCall,
    ) -> Result<B256, SystemConfigError> {
        if owner.address() != self.owner {
            return Err(SystemConfigError::NotOwner(owner.address()))
        }
        let request = TxRequest {
            chain_id: self.chain_id,
            nonce: l1.next_nonce(owner.address()),
            to: self.contract,
            input: call.abi_encode().into(),
        };
        let tx = owner.sign_transaction(request)?;
        Ok(l1.submit_transaction(tx)?)
    }
}
