use crate::{L1Transaction, SystemConfig};

use alloy_primitives::{keccak256, Bytes, B256, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};
use std::vec::Vec;

/// Information about a block.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, derive_more::Display)]
#[display("#{number} ({hash})")]
pub struct BlockInfo {
    /// The block number.
    pub number: u64,
    /// The block hash.
    pub hash: B256,
}

impl BlockInfo {
    /// Returns a new instance of [`BlockInfo`].
    pub const fn new(number: u64, hash: B256) -> Self {
        Self { number, hash }
    }
}

impl From<&L1Block> for BlockInfo {
    fn from(value: &L1Block) -> Self {
        value.info()
    }
}

impl From<&L2Block> for BlockInfo {
    fn from(value: &L2Block) -> Self {
        value.info()
    }
}

/// The fields of an L1 block committed to by its hash.
#[derive(RlpEncodable)]
struct L1BlockSeal {
    parent_hash: B256,
    number: u64,
    timestamp: u64,
    transactions_root: B256,
}

/// A block of the simulated L1 chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L1Block {
    /// The block number.
    pub number: u64,
    /// The block hash.
    pub hash: B256,
    /// The hash of the parent block.
    pub parent_hash: B256,
    /// The block timestamp.
    pub timestamp: u64,
    /// The transactions included in the block, in inclusion order.
    pub transactions: Vec<L1Transaction>,
    /// The system config as it stands after applying the block.
    pub system_config: SystemConfig,
}

impl L1Block {
    /// Seals a new block, computing its hash from the parent hash, number, timestamp and the
    /// hashes of the included transactions.
    pub fn seal(
        parent_hash: B256,
        number: u64,
        timestamp: u64,
        transactions: Vec<L1Transaction>,
        system_config: SystemConfig,
    ) -> Self {
        let mut hashes = Vec::with_capacity(transactions.len() * 32);
        for tx in &transactions {
            hashes.extend_from_slice(tx.hash().as_slice());
        }
        let seal =
            L1BlockSeal { parent_hash, number, timestamp, transactions_root: keccak256(hashes) };
        let hash = keccak256(alloy_rlp::encode(&seal));
        Self { number, hash, parent_hash, timestamp, transactions, system_config }
    }

    /// Returns the genesis block of the L1 chain.
    pub fn genesis(timestamp: u64, system_config: SystemConfig) -> Self {
        Self::seal(B256::ZERO, 0, timestamp, Vec::new(), system_config)
    }

    /// Returns the [`BlockInfo`] for the block.
    pub const fn info(&self) -> BlockInfo {
        BlockInfo { number: self.number, hash: self.hash }
    }
}

/// The header of an L2 block.
///
/// The header carries a snapshot of the [`SystemConfig`] of the block's L1 origin, so any change
/// to the system config on L1 becomes visible in the first L2 block adopting the L1 block that
/// included it.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct L2BlockHeader {
    /// The hash of the parent block.
    pub parent_hash: B256,
    /// The block number.
    pub number: u64,
    /// The block timestamp.
    pub timestamp: u64,
    /// The number of the L1 origin.
    pub l1_origin_number: u64,
    /// The hash of the L1 origin.
    pub l1_origin_hash: B256,
    /// The batcher hash of the origin's system config.
    pub batcher_hash: B256,
    /// The fee overhead of the origin's system config.
    pub overhead: U256,
    /// The fee scalar of the origin's system config.
    pub scalar: U256,
    /// The gas limit of the origin's system config.
    pub gas_limit: u64,
    /// The keccak256 hash of the RLP encoded transaction list.
    pub transactions_root: B256,
}

/// A L2 block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L2Block {
    header: L2BlockHeader,
    transactions: Vec<Bytes>,
    hash: B256,
}

impl L2Block {
    /// Returns the genesis block of the L2 chain, anchored at the L1 genesis.
    pub fn genesis(l1_genesis: BlockInfo, timestamp: u64, system_config: &SystemConfig) -> Self {
        Self::from_parts(B256::ZERO, 0, timestamp, l1_genesis, system_config, Vec::new())
    }

    /// Returns a new child block of `parent`.
    pub fn new(
        parent: BlockInfo,
        timestamp: u64,
        l1_origin: BlockInfo,
        system_config: &SystemConfig,
        transactions: Vec<Bytes>,
    ) -> Self {
        Self::from_parts(
            parent.hash,
            parent.number + 1,
            timestamp,
            l1_origin,
            system_config,
            transactions,
        )
    }

    fn from_parts(
        parent_hash: B256,
        number: u64,
        timestamp: u64,
        l1_origin: BlockInfo,
        system_config: &SystemConfig,
        transactions: Vec<Bytes>,
    ) -> Self {
        let header = L2BlockHeader {
            parent_hash,
            number,
            timestamp,
            l1_origin_number: l1_origin.number,
            l1_origin_hash: l1_origin.hash,
            batcher_hash: system_config.batcher_hash,
            overhead: system_config.overhead,
            scalar: system_config.scalar,
            gas_limit: system_config.gas_limit,
            transactions_root: keccak256(alloy_rlp::encode(&transactions)),
        };
        let hash = keccak256(alloy_rlp::encode(&header));
        Self { header, transactions, hash }
    }

    /// Returns the block hash.
    pub const fn hash(&self) -> B256 {
        self.hash
    }

    /// Returns the block number.
    pub const fn number(&self) -> u64 {
        self.header.number
    }

    /// Returns the block timestamp.
    pub const fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    /// Returns the parent hash.
    pub const fn parent_hash(&self) -> B256 {
        self.header.parent_hash
    }

    /// Returns the block header.
    pub const fn header(&self) -> &L2BlockHeader {
        &self.header
    }

    /// Returns the transactions of the block.
    pub fn transactions(&self) -> &[Bytes] {
        &self.transactions
    }

    /// Returns the [`BlockInfo`] of the block.
    pub const fn info(&self) -> BlockInfo {
        BlockInfo { number: self.header.number, hash: self.hash }
    }

    /// Returns the [`BlockInfo`] of the L1 origin.
    pub const fn l1_origin(&self) -> BlockInfo {
        BlockInfo { number: self.header.l1_origin_number, hash: self.header.l1_origin_hash }
    }

    /// Returns the system config snapshot recorded in the block.
    pub const fn system_config(&self) -> SystemConfig {
        SystemConfig {
            batcher_hash: self.header.batcher_hash,
            overhead: self.header.overhead,
            scalar: self.header.scalar,
            gas_limit: self.header.gas_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};

    fn config() -> SystemConfig {
        let batcher = address!("0x00000000000000000000000000000000000000aa");
        SystemConfig::new(batcher, 2100, 1_000_000, 30_000_000)
    }

    #[test]
    fn test_l2_block_hash_commits_to_origin_config() {
        let l1_genesis = L1Block::genesis(1_000, config());
        let genesis = L2Block::genesis(l1_genesis.info(), 1_000, &config());

        let a = L2Block::new(genesis.info(), 1_002, l1_genesis.info(), &config(), vec![]);
        let mut other = config();
        other.gas_limit = 20_000_000;
        let b = L2Block::new(genesis.info(), 1_002, l1_genesis.info(), &other, vec![]);

        assert_eq!(a.number(), 1);
        assert_eq!(a.parent_hash(), genesis.hash());
        assert_ne!(a.hash(), b.hash());
        assert_eq!(b.system_config().gas_limit, 20_000_000);
    }

    #[test]
    fn test_l2_block_hash_commits_to_transactions() {
        let l1_genesis = L1Block::genesis(1_000, config());
        let genesis = L2Block::genesis(l1_genesis.info(), 1_000, &config());

        let empty = L2Block::new(genesis.info(), 1_002, l1_genesis.info(), &config(), vec![]);
        let full =
            L2Block::new(genesis.info(), 1_002, l1_genesis.info(), &config(), vec![bytes!("01")]);

        assert_ne!(empty.hash(), full.hash());
        assert_eq!(full.transactions().len(), 1);
    }

    #[test]
    fn test_l1_genesis_is_deterministic() {
        let a = L1Block::genesis(1_000, config());
        let b = L1Block::genesis(1_000, config());
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.info(), BlockInfo::new(0, a.hash));
    }
}
