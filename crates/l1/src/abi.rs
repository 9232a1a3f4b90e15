//! The calls of the L1 system config contract.

use alloy_primitives::U256;
use alloy_sol_types::{sol, SolCall};
use harness_primitives::SystemConfig;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    function setBatcherHash(bytes32 batcherHash) external;

    #[derive(Debug, PartialEq, Eq)]
    function setGasConfig(uint256 overhead, uint256 scalar) external;

    #[derive(Debug, PartialEq, Eq)]
    function setGasLimit(uint64 gasLimit) external;
}

/// A call updating the L1 system config contract.
#[derive(Debug, PartialEq, Eq, derive_more::From)]
pub enum SystemConfigCall {
    /// A call to rotate the batcher.
    SetBatcherHash(setBatcherHashCall),
    /// A call to update the L1 fee parameters.
    SetGasConfig(setGasConfigCall),
    /// A call to update the L2 block gas limit.
    SetGasLimit(setGasLimitCall),
}

impl SystemConfigCall {
    /// Tries to decode the calldata into a [`SystemConfigCall`].
    pub fn try_decode(calldata: &[u8]) -> Option<Self> {
        let selector: [u8; 4] = calldata.get(0..4)?.try_into().ok()?;
        match selector {
            setBatcherHashCall::SELECTOR => {
                setBatcherHashCall::abi_decode(calldata).map(Into::into).ok()
            }
            setGasConfigCall::SELECTOR => {
                setGasConfigCall::abi_decode(calldata).map(Into::into).ok()
            }
            setGasLimitCall::SELECTOR => setGasLimitCall::abi_decode(calldata).map(Into::into).ok(),
            _ => None,
        }
    }

    /// Returns the ABI encoded calldata.
    pub fn abi_encode(&self) -> Vec<u8> {
        match self {
            Self::SetBatcherHash(call) => call.abi_encode(),
            Self::SetGasConfig(call) => call.abi_encode(),
            Self::SetGasLimit(call) => call.abi_encode(),
        }
    }

    /// Applies the call to the system config.
    pub fn apply(&self, config: &mut SystemConfig) {
        match self {
            Self::SetBatcherHash(call) => config.batcher_hash = call.batcherHash,
            Self::SetGasConfig(call) => {
                config.overhead = call.overhead;
                config.scalar = call.scalar;
            }
            Self::SetGasLimit(call) => config.gas_limit = call.gasLimit,
        }
    }

    /// Returns a call updating the gas config.
    pub fn gas_config(overhead: u64, scalar: u64) -> Self {
        setGasConfigCall { overhead: U256::from(overhead), scalar: U256::from(scalar) }.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, B256};
    use harness_primitives::address_as_left_padded_hash;

    #[test]
    fn test_decode_set_batcher_hash() {
        let batcher = address!("0x00000000000000000000000000000000000000bb");
        let call: SystemConfigCall =
            setBatcherHashCall { batcherHash: address_as_left_padded_hash(batcher) }.into();

        let decoded = SystemConfigCall::try_decode(&call.abi_encode());
        assert_eq!(decoded.as_ref(), Some(&call));

        let mut config = SystemConfig::default();
        call.apply(&mut config);
        assert_eq!(config.batcher_address(), batcher);
    }

    #[test]
    fn test_apply_gas_config_and_limit() {
        let mut config = SystemConfig::default();
        SystemConfigCall::gas_config(1_000, 2_000).apply(&mut config);
        SystemConfigCall::from(setGasLimitCall { gasLimit: 20_000_000 }).apply(&mut config);

        assert_eq!(config.overhead, U256::from(1_000));
        assert_eq!(config.scalar, U256::from(2_000));
        assert_eq!(config.gas_limit, 20_000_000);
    }

    #[test]
    fn test_decode_unknown_selector() {
        assert_eq!(SystemConfigCall::try_decode(&[0xde, 0xad]), None);
        assert_eq!(SystemConfigCall::try_decode(B256::ZERO.as_slice()), None);
    }
}
