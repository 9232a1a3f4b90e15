use alloy_primitives::B256;
use harness_primitives::{BlockInfo, L1Block, RollupConfig, SystemConfig};

/// The inclusion status of an L1 transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// The transaction is queued and not yet included.
    Pending,
    /// The transaction is included in the canonical block with the provided number.
    Included(u64),
    /// The transaction is unknown to the chain, either never submitted or rewound away.
    Unknown,
}

/// Read access to the canonical L1 chain.
#[auto_impl::auto_impl(&, Arc)]
pub trait L1ChainProvider {
    /// Returns the rollup config of the chain.
    fn config(&self) -> &RollupConfig;

    /// Returns the canonical head.
    fn head(&self) -> &L1Block;

    /// Returns the canonical block with the provided number.
    fn block_by_number(&self, number: u64) -> Option<&L1Block>;

    /// Returns the status of the transaction.
    fn transaction_status(&self, hash: B256) -> TransactionStatus;

    /// Returns the system config after applying the canonical block with the provided number.
    fn system_config_at(&self, number: u64) -> Option<SystemConfig> {
        self.block_by_number(number).map(|block| block.system_config)
    }

    /// Returns true if the block is part of the canonical chain.
    fn is_canonical(&self, block: &BlockInfo) -> bool {
        self.block_by_number(block.number).is_some_and(|canonical| canonical.hash == block.hash)
    }
}
