//! The batcher submits the unsafe L2 blocks of the sequencer to the L1 batch inbox.

mod error;
pub use error::BatcherError;

mod metrics;
pub use metrics::BatcherMetrics;

mod source;
pub use source::L2BlockSource;

use alloy_primitives::{Address, B256};
use harness_codec::Codec;
use harness_l1::{L1Chain, L1ChainProvider, TransactionStatus};
use harness_primitives::{BatchMode, BlockInfo, RollupConfig, TxRequest};
use harness_signer::Credential;

/// The configuration of a [`Batcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatcherConfig {
    /// The encoding of the submissions.
    pub mode: BatchMode,
    /// The maximum size of a submission payload.
    pub max_frame_size: usize,
    /// The batch inbox address.
    pub inbox: Address,
    /// The L1 chain id.
    pub l1_chain_id: u64,
}

impl BatcherConfig {
    /// Returns the [`BatcherConfig`] for the rollup, submitting in `mode`.
    pub const fn new(config: &RollupConfig, mode: BatchMode) -> Self {
        Self {
            mode,
            max_frame_size: config.max_frame_size,
            inbox: config.batch_inbox_address,
            l1_chain_id: config.l1_chain_id,
        }
    }
}

/// A submission not known to be dropped by L1.
#[derive(Debug, Clone, Copy)]
struct Submission {
    /// The submission transaction hash.
    tx_hash: B256,
    /// The parent of the first submitted block.
    parent: BlockInfo,
}

/// The batcher.
#[derive(Debug)]
pub struct Batcher {
    /// The credential signing the submissions.
    credential: Credential,
    /// The batcher configuration.
    config: BatcherConfig,
    /// The last submitted block.
    last_submitted: Option<BlockInfo>,
    /// The submissions which were not rewound away.
    in_flight: Vec<Submission>,
    /// The metrics of the batcher.
    metrics: BatcherMetrics,
}

impl Batcher {
    /// Returns a new [`Batcher`] signing with the credential.
    pub fn new(credential: Credential, config: BatcherConfig) -> Self {
        Self {
            credential,
            config,
            last_submitted: None,
            in_flight: Vec::new(),
            metrics: BatcherMetrics::default(),
        }
    }

    /// Returns the credential of the batcher.
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Returns the address of the batcher.
    pub fn address(&self) -> Address {
        self.credential.address()
    }

    /// Returns the encoding of the batcher.
    pub const fn mode(&self) -> BatchMode {
        self.config.mode
    }

    /// Returns the last submitted block.
    pub const fn last_submitted(&self) -> Option<BlockInfo> {
        self.last_submitted
    }

    /// Submits every unsafe block after the last submitted one, returning the hash of the queued
    /// transaction, or [`None`] if there is nothing new to submit.
    pub fn submit_all<S: L2BlockSource>(
        &mut self,
        l2: &S,
        l1: &mut L1Chain,
    ) -> Result<Option<B256>, BatcherError> {
        self.rewind_watermark(l2, l1);

        let start = self.last_submitted.unwrap_or_else(|| l2.safe_head()).number + 1;
        let end = l2.unsafe_head().number;
        if start > end {
            tracing::debug!(target: "harness::batcher", batcher = %self.credential.name(), "nothing to submit");
            return Ok(None)
        }

        let blocks = (start..=end)
            .map(|number| l2.unsafe_block(number).cloned().ok_or(BatcherError::MissingBlock(number)))
            .collect::<Result<Vec<_>, _>>()?;
        let input = Codec::encode(self.config.mode, &blocks, self.config.max_frame_size)?;
        let payload_size = input.len();

        let request = TxRequest {
            chain_id: self.config.l1_chain_id,
            nonce: l1.next_nonce(self.address()),
            to: self.config.inbox,
            input,
        };
        let tx = self.credential.sign_transaction(request)?;
        let tx_hash = l1.submit_transaction(tx)?;

        let parent = BlockInfo::new(start - 1, blocks[0].parent_hash());
        let last = blocks[blocks.len() - 1].info();
        self.in_flight.push(Submission { tx_hash, parent });
        self.last_submitted = Some(last);

        self.metrics.submissions.increment(1);
        self.metrics.submitted_blocks.increment(blocks.len() as u64);
        self.metrics.payload_size.record(payload_size as f64);
        tracing::info!(target: "harness::batcher", batcher = %self.credential.name(), mode = %self.config.mode, first = start, %last, %tx_hash, payload_size, "submitted blocks");

        Ok(Some(tx_hash))
    }

    /// Rewinds the watermark to the parent of the earliest submission dropped by L1, then to the
    /// safe head if the watermark block was reorged out of the L2 chain.
    fn rewind_watermark<S: L2BlockSource>(&mut self, l2: &S, l1: &L1Chain) {
        let mut rewind_to: Option<BlockInfo> = None;
        self.in_flight.retain(|submission| {
            if l1.transaction_status(submission.tx_hash) != TransactionStatus::Unknown {
                return true
            }
            if rewind_to.is_none_or(|to| submission.parent.number < to.number) {
                rewind_to = Some(submission.parent);
            }
            false
        });

        if let Some(parent) = rewind_to {
            if self.last_submitted.is_none_or(|last| parent.number < last.number) {
                tracing::info!(target: "harness::batcher", batcher = %self.credential.name(), watermark = %parent, "submission dropped by L1, rewinding watermark");
                self.last_submitted = Some(parent);
                self.metrics.watermark_rewinds.increment(1);
            }
        }

        if let Some(last) = self.last_submitted {
            let canonical = l2.unsafe_block(last.number).is_some_and(|block| block.hash() == last.hash);
            if !canonical {
                tracing::info!(target: "harness::batcher", batcher = %self.credential.name(), watermark = %last, "watermark reorged out, restarting from safe head");
                self.last_submitted = None;
                self.metrics.watermark_rewinds.increment(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use harness_codec::{CodecError, EncodingError};
    use harness_primitives::SystemConfig;
    use harness_sequencer::Sequencer;
    use std::sync::Arc;

    struct Fixture {
        l1: L1Chain,
        sequencer: Sequencer,
        config: Arc<RollupConfig>,
        alice: Credential,
    }

    fn fixture() -> eyre::Result<Fixture> {
        let alice = Credential::from_seed("batcher", "alice")?;
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
            delta_time: Some(1_000),
            max_frame_size: 120_000,
        });
        let l1 = L1Chain::new(config.clone());
        let sequencer = Sequencer::new(config.clone(), &l1, l1.subscribe())?;
        Ok(Fixture { l1, sequencer, config, alice })
    }

    fn advance(l1: &mut L1Chain, sequencer: &mut Sequencer) -> eyre::Result<()> {
        l1.act_empty_block()?;
        sequencer.act_l1_head_signal();
        sequencer.act_build_to_l1_head(&*l1)?;
        Ok(())
    }

    fn include(l1: &mut L1Chain, batcher: &Batcher) -> eyre::Result<()> {
        l1.act_l1_start_block(1)?;
        l1.act_l1_include_tx(batcher.address())?;
        l1.act_l1_end_block()?;
        Ok(())
    }

    #[test]
    fn test_submit_all_submits_new_blocks_once() -> eyre::Result<()> {
        let Fixture { mut l1, mut sequencer, config, alice } = fixture()?;
        let mut batcher = Batcher::new(alice, BatcherConfig::new(&config, BatchMode::Span));

        assert_eq!(batcher.submit_all(&sequencer, &mut l1)?, None);

        advance(&mut l1, &mut sequencer)?;
        let hash = batcher.submit_all(&sequencer, &mut l1)?;
        assert!(hash.is_some());
        assert_eq!(batcher.last_submitted(), Some(sequencer.unsafe_head().info()));
        assert_eq!(batcher.submit_all(&sequencer, &mut l1)?, None);

        include(&mut l1, &batcher)?;
        advance(&mut l1, &mut sequencer)?;
        assert!(batcher.submit_all(&sequencer, &mut l1)?.is_some());
        assert_eq!(l1.next_nonce(batcher.address()), 2);

        Ok(())
    }

    #[test]
    fn test_dropped_submission_rewinds_watermark() -> eyre::Result<()> {
        let Fixture { mut l1, mut sequencer, config, alice } = fixture()?;
        let mut batcher = Batcher::new(alice, BatcherConfig::new(&config, BatchMode::Singular));

        advance(&mut l1, &mut sequencer)?;
        batcher.submit_all(&sequencer, &mut l1)?;
        include(&mut l1, &batcher)?;
        let submitted = batcher.last_submitted();

        // removes the inclusion block, keeping the unsafe blocks.
        l1.act_l1_rewind_depth(1)?;
        assert!(batcher.submit_all(&sequencer, &mut l1)?.is_some());
        assert_eq!(batcher.last_submitted(), submitted);

        Ok(())
    }

    #[test]
    fn test_reorged_watermark_restarts_from_safe_head() -> eyre::Result<()> {
        let Fixture { mut l1, mut sequencer, config, alice } = fixture()?;
        let mut batcher = Batcher::new(alice, BatcherConfig::new(&config, BatchMode::Singular));

        advance(&mut l1, &mut sequencer)?;
        batcher.submit_all(&sequencer, &mut l1)?;
        let stale = batcher.last_submitted();

        // replace the empty origin of the submitted blocks with one carrying the submission.
        l1.act_l1_rewind_depth(1)?;
        include(&mut l1, &batcher)?;
        sequencer.act_l1_head_signal();
        sequencer.act_build_to_l1_head(&l1)?;
        assert_ne!(stale, Some(sequencer.unsafe_head().info()));
        assert_eq!(stale.map(|block| block.number), Some(sequencer.unsafe_head().number()));

        assert!(batcher.submit_all(&sequencer, &mut l1)?.is_some());
        assert_eq!(batcher.last_submitted(), Some(sequencer.unsafe_head().info()));
        assert_eq!(l1.next_nonce(batcher.address()), 2);

        Ok(())
    }

    #[test]
    fn test_oversized_range_is_rejected() -> eyre::Result<()> {
        let Fixture { mut l1, mut sequencer, config, alice } = fixture()?;
        let mut batcher_config = BatcherConfig::new(&config, BatchMode::Singular);
        batcher_config.max_frame_size = 4;
        let mut batcher = Batcher::new(alice, batcher_config);

        advance(&mut l1, &mut sequencer)?;
        let err = batcher.submit_all(&sequencer, &mut l1).unwrap_err();
        assert!(matches!(
            err,
            BatcherError::Codec(CodecError::Encoding(EncodingError::PayloadTooLarge { max: 4, .. }))
        ));
        assert_eq!(l1.next_nonce(batcher.address()), 0);

        Ok(())
    }
}
