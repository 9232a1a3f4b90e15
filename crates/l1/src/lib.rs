//! The simulated L1 chain of the derivation harness.
//!
//! The chain only progresses through explicit actions: blocks are opened, filled with queued
//! transactions, sealed and rewound by the caller. Each block records the system config as it
//! stands after applying its transactions.

pub mod abi;
use abi::SystemConfigCall;

mod error;
pub use error::{L1ChainError, SystemConfigError};

mod metrics;
pub use metrics::L1ChainMetrics;

mod mutator;
pub use mutator::SystemConfigMutator;

mod provider;
pub use provider::{L1ChainProvider, TransactionStatus};

use alloy_primitives::{Address, B256};
use harness_primitives::{BlockInfo, L1Block, L1Transaction, RollupConfig, SystemConfig};
use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::Arc,
};
use tokio::sync::watch;

/// A block being built.
#[derive(Debug)]
struct BlockBuilder {
    capacity: usize,
    transactions: Vec<L1Transaction>,
    system_config: SystemConfig,
}

/// The simulated L1 chain.
#[derive(Debug)]
pub struct L1Chain {
    /// The rollup config.
    config: Arc<RollupConfig>,
    /// The canonical chain, indexed by block number.
    blocks: Vec<L1Block>,
    /// The queued transactions per sender, in submission order.
    pending: BTreeMap<Address, VecDeque<L1Transaction>>,
    /// The open block, if any.
    building: Option<BlockBuilder>,
    /// The block number of every canonical transaction.
    included: HashMap<B256, u64>,
    /// The next nonce per sender. Nonces are never handed out twice, even across rewinds.
    nonces: HashMap<Address, u64>,
    /// The sender half of the head channel.
    head_tx: watch::Sender<BlockInfo>,
    /// The metrics of the chain.
    metrics: L1ChainMetrics,
}

impl L1Chain {
    /// Returns a new [`L1Chain`] holding only the genesis block.
    pub fn new(config: Arc<RollupConfig>) -> Self {
        let genesis = L1Block::genesis(config.genesis_timestamp, config.genesis_system_config);
        let (head_tx, _) = watch::channel(genesis.info());
        Self {
            config,
            blocks: vec![genesis],
            pending: BTreeMap::new(),
            building: None,
            included: HashMap::new(),
            nonces: HashMap::new(),
            head_tx,
            metrics: L1ChainMetrics::default(),
        }
    }

    /// Returns a receiver of the canonical head, updated on every sealed block and rewind.
    pub fn subscribe(&self) -> watch::Receiver<BlockInfo> {
        self.head_tx.subscribe()
    }

    /// Returns the next nonce of the sender.
    pub fn next_nonce(&self, sender: Address) -> u64 {
        self.nonces.get(&sender).copied().unwrap_or_default()
    }

    /// Queues the transaction for inclusion, returning its hash.
    pub fn submit_transaction(&mut self, tx: L1Transaction) -> Result<B256, L1ChainError> {
        let hash = tx.hash();
        let sender = tx.sender();
        if tx.recover_signer().ok() != Some(sender) {
            return Err(L1ChainError::InvalidSignature { hash, sender })
        }
        if tx.request().chain_id != self.config.l1_chain_id {
            return Err(L1ChainError::ChainIdMismatch {
                hash,
                expected: self.config.l1_chain_id,
                got: tx.request().chain_id,
            })
        }
        let expected = self.next_nonce(sender);
        if tx.nonce() != expected {
            return Err(L1ChainError::NonceMismatch { sender, expected, got: tx.nonce() })
        }

        self.nonces.insert(sender, expected + 1);
        self.pending.entry(sender).or_default().push_back(tx);
        tracing::trace!(target: "harness::l1", %sender, %hash, "queued transaction");

        Ok(hash)
    }

    /// Opens a new block holding at most `capacity` transactions.
    pub fn act_l1_start_block(&mut self, capacity: usize) -> Result<(), L1ChainError> {
        if self.building.is_some() {
            return Err(L1ChainError::BlockAlreadyOpen)
        }
        self.building = Some(BlockBuilder {
            capacity,
            transactions: Vec::new(),
            system_config: self.head().system_config,
        });
        Ok(())
    }

    /// Includes the oldest queued transaction of `sender` in the open block.
    ///
    /// A transaction rejected at inclusion stays queued.
    pub fn act_l1_include_tx(&mut self, sender: Address) -> Result<B256, L1ChainError> {
        let builder = self.building.as_mut().ok_or(L1ChainError::NoOpenBlock)?;
        if builder.transactions.len() >= builder.capacity {
            return Err(L1ChainError::BlockFull(builder.capacity))
        }
        let queue =
            self.pending.get_mut(&sender).ok_or(L1ChainError::NoPendingTransaction(sender))?;
        let tx = queue.front().ok_or(L1ChainError::NoPendingTransaction(sender))?;

        if tx.to() == self.config.system_config_address {
            let mut system_config = builder.system_config;
            let applied = apply_system_config_update(&self.config, tx, &mut system_config);
            if let Err(err) = applied {
                self.metrics.rejected_transactions.increment(1);
                tracing::warn!(target: "harness::l1", %sender, hash = %tx.hash(), %err, "rejected transaction");
                return Err(err)
            }
            builder.system_config = system_config;
        }

        let Some(tx) = queue.pop_front() else {
            return Err(L1ChainError::NoPendingTransaction(sender))
        };
        let hash = tx.hash();
        builder.transactions.push(tx);
        self.metrics.included_transactions.increment(1);
        tracing::trace!(target: "harness::l1", %sender, %hash, "included transaction");

        Ok(hash)
    }

    /// Seals the open block and appends it to the chain.
    pub fn act_l1_end_block(&mut self) -> Result<BlockInfo, L1ChainError> {
        let builder = self.building.take().ok_or(L1ChainError::NoOpenBlock)?;
        let parent = self.head();
        let block = L1Block::seal(
            parent.hash,
            parent.number + 1,
            parent.timestamp + self.config.l1_block_time,
            builder.transactions,
            builder.system_config,
        );
        let info = block.info();

        for tx in &block.transactions {
            self.included.insert(tx.hash(), block.number);
        }
        tracing::debug!(target: "harness::l1", block = %info, txs = block.transactions.len(), "sealed block");
        self.blocks.push(block);
        self.metrics.blocks.increment(1);
        self.head_tx.send_replace(info);

        Ok(info)
    }

    /// Seals a block without transactions.
    pub fn act_empty_block(&mut self) -> Result<BlockInfo, L1ChainError> {
        self.act_l1_start_block(0)?;
        self.act_l1_end_block()
    }

    /// Removes the last `depth` blocks, their transactions and their system config updates.
    ///
    /// The removed transactions are dropped. The chain is left untouched on error.
    pub fn act_l1_rewind_depth(&mut self, depth: u64) -> Result<BlockInfo, L1ChainError> {
        if self.building.is_some() {
            return Err(L1ChainError::BlockAlreadyOpen)
        }
        let head = self.head().number;
        if depth > head {
            return Err(L1ChainError::RewindTooDeep { depth, head })
        }
        if depth == 0 {
            return Ok(self.head().info())
        }

        let new_len = usize::try_from(head - depth + 1)
            .map_err(|_| L1ChainError::RewindTooDeep { depth, head })?;
        for block in self.blocks.drain(new_len..) {
            for tx in &block.transactions {
                self.included.remove(&tx.hash());
            }
        }

        let info = self.head().info();
        self.metrics.reorgs.increment(1);
        self.metrics.reorg_depths.record(depth as f64);
        tracing::info!(target: "harness::l1", depth, head = %info, "rewound chain");
        self.head_tx.send_replace(info);

        Ok(info)
    }
}

impl L1ChainProvider for L1Chain {
    fn config(&self) -> &RollupConfig {
        &self.config
    }

    fn head(&self) -> &L1Block {
        // the genesis block is never removed.
        &self.blocks[self.blocks.len() - 1]
    }

    fn block_by_number(&self, number: u64) -> Option<&L1Block> {
        usize::try_from(number).ok().and_then(|index| self.blocks.get(index))
    }

    fn transaction_status(&self, hash: B256) -> TransactionStatus {
        if let Some(number) = self.included.get(&hash) {
            return TransactionStatus::Included(*number)
        }
        let pending = self.pending.values().flatten().any(|tx| tx.hash() == hash) ||
            self.building
                .as_ref()
                .is_some_and(|builder| builder.transactions.iter().any(|tx| tx.hash() == hash));
        if pending {
            TransactionStatus::Pending
        } else {
            TransactionStatus::Unknown
        }
    }
}

/// Applies the system config call carried by `tx`, checking it is sent by the owner.
fn apply_system_config_update(
    config: &RollupConfig,
    tx: &L1Transaction,
    system_config: &mut SystemConfig,
) -> Result<(), L1ChainError> {
    if tx.sender() != config.system_config_owner {
        return Err(L1ChainError::UnauthorizedConfigUpdate(tx.sender()))
    }
    let call =
        SystemConfigCall::try_decode(tx.input()).ok_or(L1ChainError::InvalidConfigCall(tx.hash()))?;
    call.apply(system_config);
    Ok(())
}
