use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Returns the address left padded to a 32 bytes word, the format in which the system config
/// stores the authorized batcher.
pub fn address_as_left_padded_hash(address: Address) -> B256 {
    address.into_word()
}

/// The on-chain system config of the rollup.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    /// The left padded address of the authorized batcher.
    pub batcher_hash: B256,
    /// The L1 fee overhead.
    pub overhead: U256,
    /// The L1 fee scalar.
    pub scalar: U256,
    /// The L2 block gas limit.
    pub gas_limit: u64,
}

impl SystemConfig {
    /// Returns a new [`SystemConfig`] authorizing `batcher`.
    pub fn new(batcher: Address, overhead: u64, scalar: u64, gas_limit: u64) -> Self {
        Self {
            batcher_hash: address_as_left_padded_hash(batcher),
            overhead: U256::from(overhead),
            scalar: U256::from(scalar),
            gas_limit,
        }
    }

    /// Returns true if `signer` is the authorized batcher.
    pub fn is_authorized_batcher(&self, signer: Address) -> bool {
        self.batcher_hash == address_as_left_padded_hash(signer)
    }

    /// Returns the authorized batcher address.
    pub fn batcher_address(&self) -> Address {
        Address::from_word(self.batcher_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_batcher_authorization() {
        let alice = address!("0x1111111111111111111111111111111111111111");
        let bob = address!("0x2222222222222222222222222222222222222222");
        let config = SystemConfig::new(alice, 2100, 1_000_000, 30_000_000);

        assert!(config.is_authorized_batcher(alice));
        assert!(!config.is_authorized_batcher(bob));
        assert_eq!(config.batcher_address(), alice);
        assert_eq!(&config.batcher_hash[..12], &[0u8; 12]);
    }
}
