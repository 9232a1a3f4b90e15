//! This library contains the sequencer, which builds the unsafe L2 chain on top of the L1 head it
//! was signalled and runs the derivation pipeline to advance the safe chain.

use harness_derivation_pipeline::{DerivationError, DerivationPipeline};
use harness_l1::L1ChainProvider;
use harness_primitives::{BlockInfo, L2Block, RollupConfig};
use std::sync::Arc;
use tokio::sync::watch;

mod error;
pub use error::SequencerError;

mod metrics;
pub use metrics::SequencerMetrics;

/// The state of the [`Sequencer`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SequencerState {
    /// No action was performed yet.
    #[default]
    Idle,
    /// The unsafe chain is being built to the signalled L1 head.
    BuildingToL1Head,
    /// The last build or derivation run succeeded.
    Derived,
    /// The last derivation run failed.
    Errored,
}

/// The sequencer is responsible for building the unsafe chain and deriving the safe chain.
#[derive(Debug)]
pub struct Sequencer {
    /// The rollup config.
    config: Arc<RollupConfig>,
    /// The unsafe chain, indexed by block number.
    unsafe_chain: Vec<L2Block>,
    /// The derivation pipeline holding the safe chain.
    pipeline: DerivationPipeline,
    /// The receiver of the L1 head.
    l1_head_rx: watch::Receiver<BlockInfo>,
    /// The last signalled L1 head.
    l1_head: BlockInfo,
    /// The state of the sequencer.
    state: SequencerState,
    /// The error of the last derivation run.
    error: Option<DerivationError>,
    /// The metrics of the sequencer.
    metrics: SequencerMetrics,
}

impl Sequencer {
    /// Creates a new sequencer at the L2 genesis, anchored on the L1 genesis of the provider.
    pub fn new<P: L1ChainProvider>(
        config: Arc<RollupConfig>,
        l1: &P,
        l1_head_rx: watch::Receiver<BlockInfo>,
    ) -> Result<Self, SequencerError> {
        let l1_genesis = l1.block_by_number(0).ok_or(SequencerError::MissingL1Block(0))?.info();
        let genesis = L2Block::genesis(
            l1_genesis,
            config.genesis_timestamp,
            &config.genesis_system_config,
        );
        Ok(Self {
            pipeline: DerivationPipeline::new(config.clone(), genesis.clone()),
            config,
            unsafe_chain: vec![genesis],
            l1_head_rx,
            l1_head: l1_genesis,
            state: SequencerState::Idle,
            error: None,
            metrics: SequencerMetrics::default(),
        })
    }

    /// Consumes the latest published L1 head, returning it.
    pub fn act_l1_head_signal(&mut self) -> BlockInfo {
        self.l1_head = *self.l1_head_rx.borrow_and_update();
        tracing::debug!(target: "harness::sequencer", l1_head = %self.l1_head, "received L1 head");
        self.l1_head
    }

    /// Builds unsafe blocks until the origin of the unsafe head is the signalled L1 head.
    ///
    /// Unsafe blocks whose origin is no longer canonical are dropped first. Returns the number of
    /// built blocks.
    pub fn act_build_to_l1_head<P: L1ChainProvider>(
        &mut self,
        l1: &P,
    ) -> Result<usize, SequencerError> {
        if self.state == SequencerState::Errored {
            return Err(SequencerError::Errored)
        }
        self.drop_reorged_unsafe_blocks(l1);
        if !l1.is_canonical(&self.l1_head) {
            return Err(SequencerError::StaleL1Head(self.l1_head))
        }

        self.state = SequencerState::BuildingToL1Head;
        let mut built = 0;
        while self.unsafe_head().l1_origin().number < self.l1_head.number {
            let parent = self.unsafe_head();
            let timestamp = parent.timestamp() + self.config.block_time;
            let current = parent.l1_origin().number;
            let mut origin =
                l1.block_by_number(current).ok_or(SequencerError::MissingL1Block(current))?;
            if let Some(next) = l1.block_by_number(current + 1) {
                if next.timestamp <= timestamp {
                    origin = next;
                }
            }

            let block =
                L2Block::new(parent.info(), timestamp, origin.info(), &origin.system_config, vec![]);
            tracing::trace!(target: "harness::sequencer", block = %block.info(), origin = %origin.info(), "built unsafe block");
            self.unsafe_chain.push(block);
            built += 1;
        }

        self.state = SequencerState::Derived;
        self.metrics.built_blocks.increment(built as u64);
        self.metrics.unsafe_head.set(self.unsafe_head().number() as f64);
        tracing::info!(target: "harness::sequencer", built, unsafe_head = %self.unsafe_head().info(), l1_head = %self.l1_head, "built to L1 head");

        Ok(built)
    }

    /// Runs the derivation pipeline up to the canonical L1 head and consolidates the unsafe chain
    /// onto the resulting safe chain.
    ///
    /// A failure does not abort the action: it is recorded and returned by [`Sequencer::error`].
    pub fn act_l2_pipeline_full<P: L1ChainProvider>(&mut self, l1: &P) -> SequencerState {
        self.error = None;
        match self.pipeline.derive_to_head(l1) {
            Ok(safe_head) => {
                tracing::info!(target: "harness::sequencer", %safe_head, "derived to L1 head");
                self.state = SequencerState::Derived;
            }
            Err(err) => {
                tracing::warn!(target: "harness::sequencer", %err, "derivation errored");
                self.metrics.derivation_errors.increment(1);
                self.error = Some(err);
                self.state = SequencerState::Errored;
            }
        }
        self.consolidate();
        self.metrics.safe_head.set(self.safe_head().number() as f64);
        self.state
    }

    /// Returns the error of the last derivation run, if any.
    pub const fn error(&self) -> Option<&DerivationError> {
        self.error.as_ref()
    }

    /// Returns the state of the sequencer.
    pub const fn state(&self) -> SequencerState {
        self.state
    }

    /// Returns the last signalled L1 head.
    pub const fn l1_head(&self) -> BlockInfo {
        self.l1_head
    }

    /// Returns the unsafe head.
    pub fn unsafe_head(&self) -> &L2Block {
        // the genesis is never removed from the unsafe chain.
        &self.unsafe_chain[self.unsafe_chain.len() - 1]
    }

    /// Returns the unsafe block with the provided number.
    pub fn unsafe_block(&self, number: u64) -> Option<&L2Block> {
        usize::try_from(number).ok().and_then(|index| self.unsafe_chain.get(index))
    }

    /// Returns the safe head.
    pub fn safe_head(&self) -> &L2Block {
        self.pipeline.safe_head()
    }

    /// Returns the derivation pipeline.
    pub const fn pipeline(&self) -> &DerivationPipeline {
        &self.pipeline
    }

    /// Drops the unsafe blocks, from the first one whose origin is no longer canonical.
    fn drop_reorged_unsafe_blocks<P: L1ChainProvider>(&mut self, l1: &P) {
        let Some(index) =
            self.unsafe_chain.iter().position(|block| !l1.is_canonical(&block.l1_origin()))
        else {
            return
        };
        let dropped = self.unsafe_chain.len() - index;
        self.unsafe_chain.truncate(index);
        self.metrics.dropped_unsafe_blocks.increment(dropped as u64);
        tracing::info!(target: "harness::sequencer", dropped, unsafe_head = %self.unsafe_head().info(), "dropped reorged unsafe blocks");
    }

    /// Makes the unsafe chain extend the safe chain, replacing the diverging unsafe blocks.
    fn consolidate(&mut self) {
        let safe_chain = self.pipeline.safe_chain();
        let diverged = safe_chain
            .iter()
            .zip(&self.unsafe_chain)
            .position(|(safe, unsafe_block)| safe.hash() != unsafe_block.hash());

        let start = match diverged {
            Some(index) => index,
            None if safe_chain.len() > self.unsafe_chain.len() => self.unsafe_chain.len(),
            None => return,
        };

        let dropped = self.unsafe_chain.len().saturating_sub(start);
        self.unsafe_chain.truncate(start);
        self.unsafe_chain.extend_from_slice(&safe_chain[start..]);
        if dropped > 0 {
            self.metrics.dropped_unsafe_blocks.increment(dropped as u64);
            tracing::info!(target: "harness::sequencer", dropped, unsafe_head = %self.unsafe_head().info(), "consolidated unsafe chain onto safe chain");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use harness_codec::Codec;
    use harness_l1::L1Chain;
    use harness_primitives::{BatchMode, SystemConfig, TxRequest};
    use harness_signer::Credential;

    fn setup() -> eyre::Result<(L1Chain, Sequencer, Credential)> {
        let alice = Credential::from_seed("sequencer", "alice")?;
        let config = Arc::new(RollupConfig {
            l1_chain_id: 900,
            l2_chain_id: 901,
            genesis_timestamp: 1_000,
            genesis_system_config: SystemConfig::new(alice.address(), 2100, 1_000_000, 30_000_000),
            l1_block_time: 12,
            block_time: 2,
            batch_inbox_address: address!("0xff00000000000000000000000000000000000901"),
            system_config_address: address!("0x5500000000000000000000000000000000000001"),
            system_config_owner: address!("0x00000000000000000000000000000000000000dd"),
            delta_time: None,
            max_frame_size: 120_000,
        });
        let l1 = L1Chain::new(config.clone());
        let sequencer = Sequencer::new(config, &l1, l1.subscribe())?;
        Ok((l1, sequencer, alice))
    }

    fn submit_unsafe(l1: &mut L1Chain, sequencer: &Sequencer, batcher: &Credential) -> eyre::Result<()> {
        let blocks = (sequencer.safe_head().number() + 1..=sequencer.unsafe_head().number())
            .filter_map(|n| sequencer.unsafe_block(n).cloned())
            .collect::<Vec<_>>();
        let request = TxRequest {
            chain_id: 900,
            nonce: l1.next_nonce(batcher.address()),
            to: l1.config().batch_inbox_address,
            input: Codec::encode(BatchMode::Singular, &blocks, 120_000)?,
        };
        l1.submit_transaction(batcher.sign_transaction(request)?)?;
        l1.act_l1_start_block(1)?;
        l1.act_l1_include_tx(batcher.address())?;
        l1.act_l1_end_block()?;
        Ok(())
    }

    #[test]
    fn test_build_to_l1_head() -> eyre::Result<()> {
        let (mut l1, mut sequencer, _) = setup()?;
        l1.act_empty_block()?;

        // nothing to build before the head is signalled.
        assert_eq!(sequencer.act_build_to_l1_head(&l1)?, 0);

        let head = sequencer.act_l1_head_signal();
        assert_eq!(sequencer.act_build_to_l1_head(&l1)?, 6);
        assert_eq!(sequencer.unsafe_head().l1_origin(), head);
        assert_eq!(sequencer.unsafe_head().timestamp(), 1_012);
        assert_eq!(sequencer.state(), SequencerState::Derived);

        Ok(())
    }

    #[test]
    fn test_pipeline_full_makes_unsafe_safe() -> eyre::Result<()> {
        let (mut l1, mut sequencer, alice) = setup()?;
        l1.act_empty_block()?;
        sequencer.act_l1_head_signal();
        sequencer.act_build_to_l1_head(&l1)?;

        assert_eq!(sequencer.act_l2_pipeline_full(&l1), SequencerState::Derived);
        assert_eq!(sequencer.safe_head().number(), 0);

        submit_unsafe(&mut l1, &sequencer, &alice)?;
        assert_eq!(sequencer.act_l2_pipeline_full(&l1), SequencerState::Derived);
        assert!(sequencer.error().is_none());
        assert_eq!(sequencer.safe_head(), sequencer.unsafe_head());

        Ok(())
    }

    #[test]
    fn test_reorg_drops_unsafe_blocks() -> eyre::Result<()> {
        let (mut l1, mut sequencer, _) = setup()?;
        l1.act_empty_block()?;
        l1.act_empty_block()?;
        sequencer.act_l1_head_signal();
        sequencer.act_build_to_l1_head(&l1)?;
        assert_eq!(sequencer.unsafe_head().number(), 12);

        l1.act_l1_rewind_depth(2)?;
        let err = sequencer.act_build_to_l1_head(&l1).unwrap_err();
        assert!(matches!(err, SequencerError::StaleL1Head(_)));
        assert_eq!(sequencer.unsafe_head().number(), 5);

        l1.act_empty_block()?;
        sequencer.act_l1_head_signal();
        assert_eq!(sequencer.act_build_to_l1_head(&l1)?, 1);
        assert_eq!(sequencer.unsafe_head().l1_origin(), l1.head().info());

        Ok(())
    }
}
