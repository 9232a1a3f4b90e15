//! A synchronous derivation pipeline for the harness.
//!
//! The pipeline walks the canonical L1 chain block by block, extracting the batches submitted to
//! the batch inbox and turning them into safe L2 blocks. A checkpoint is recorded for every
//! consumed L1 block, so an L1 reorg only rewinds the derivation to the last checkpoint that is
//! still canonical.

mod batch;
pub use batch::{Batch, BatchBlock, BatchValidity, DropReason, ParentCheck};

mod error;
pub use error::DerivationError;

mod metrics;
pub use metrics::DerivationPipelineMetrics;

use alloy_primitives::Address;
use harness_codec::{BatchPayload, Codec};
use harness_l1::L1ChainProvider;
use harness_primitives::{BlockInfo, L1Block, L1Transaction, L2Block, RollupConfig};
use std::{collections::BTreeMap, sync::Arc};

/// The derivation state after consuming an L1 block.
#[derive(Debug, Clone)]
struct Checkpoint {
    /// The consumed L1 block.
    l1: BlockInfo,
    /// The safe head after consuming the block.
    safe_head: BlockInfo,
    /// The buffered batches after consuming the block.
    future: BTreeMap<u64, Batch>,
}

/// Safe blocks overwritten by a replacing batch.
#[derive(Debug, Clone)]
struct Displaced {
    /// The number of checkpoints recorded when the blocks were overwritten.
    checkpoint: usize,
    /// The index of the first overwritten block.
    index: usize,
    /// The overwritten blocks.
    blocks: Vec<L2Block>,
}

/// The derivation pipeline.
#[derive(Debug)]
pub struct DerivationPipeline {
    /// The rollup config.
    config: Arc<RollupConfig>,
    /// The safe chain, indexed by block number.
    safe_chain: Vec<L2Block>,
    /// One checkpoint per consumed L1 block, the first one being the L1 genesis.
    checkpoints: Vec<Checkpoint>,
    /// The batches which do not connect to the safe chain yet, keyed by their first block number.
    future: BTreeMap<u64, Batch>,
    /// The overwritten safe blocks, in replacement order, undone when restoring a checkpoint.
    displaced: Vec<Displaced>,
    /// The metrics of the pipeline.
    metrics: DerivationPipelineMetrics,
}

impl DerivationPipeline {
    /// Returns a new instance of the [`DerivationPipeline`] starting from the L2 genesis.
    pub fn new(config: Arc<RollupConfig>, l2_genesis: L2Block) -> Self {
        let genesis = Checkpoint {
            l1: l2_genesis.l1_origin(),
            safe_head: l2_genesis.info(),
            future: BTreeMap::new(),
        };
        Self {
            config,
            safe_chain: vec![l2_genesis],
            checkpoints: vec![genesis],
            future: BTreeMap::new(),
            displaced: Vec::new(),
            metrics: DerivationPipelineMetrics::default(),
        }
    }

    /// Returns the safe chain.
    pub fn safe_chain(&self) -> &[L2Block] {
        &self.safe_chain
    }

    /// Returns the safe head.
    pub fn safe_head(&self) -> &L2Block {
        // the genesis is never removed from the safe chain.
        &self.safe_chain[self.safe_chain.len() - 1]
    }

    /// Returns the safe block with the provided number.
    pub fn safe_block(&self, number: u64) -> Option<&L2Block> {
        usize::try_from(number).ok().and_then(|index| self.safe_chain.get(index))
    }

    /// Returns the last consumed L1 block.
    pub fn l1_cursor(&self) -> BlockInfo {
        self.last_checkpoint().l1
    }

    /// Derives every canonical L1 block up to the head, returning the safe head.
    ///
    /// The pipeline is first reset to the last checkpoint still canonical. On error, the state of
    /// the last consumed L1 block is restored, so the failing block is processed again on the
    /// next call.
    pub fn derive_to_head<P: L1ChainProvider>(
        &mut self,
        l1: &P,
    ) -> Result<BlockInfo, DerivationError> {
        self.reset(l1);

        let head = l1.head().number;
        for number in self.l1_cursor().number + 1..=head {
            let block = l1.block_by_number(number).ok_or(DerivationError::MissingL1Block(number))?;
            if let Err(err) = self.process_l1_block(l1, block) {
                tracing::error!(target: "harness::derivation", l1 = %block.info(), %err, "derivation failed");
                self.restore_checkpoint();
                return Err(err)
            }
        }

        Ok(self.safe_head().info())
    }

    /// Rewinds the pipeline to the last checkpoint whose L1 block is canonical.
    fn reset<P: L1ChainProvider>(&mut self, l1: &P) {
        let keep = self
            .checkpoints
            .iter()
            .rposition(|checkpoint| l1.is_canonical(&checkpoint.l1))
            .unwrap_or_default();

        let depth = self.checkpoints.len() - 1 - keep;
        if depth == 0 {
            return
        }

        self.checkpoints.truncate(keep + 1);
        self.restore_checkpoint();
        self.metrics.resets.increment(1);
        tracing::info!(target: "harness::derivation", depth, l1 = %self.l1_cursor(), safe_head = %self.safe_head().info(), "reset derivation");
    }

    /// Restores the safe chain and the buffered batches of the last checkpoint.
    ///
    /// Safe blocks overwritten after the checkpoint are put back before truncating.
    fn restore_checkpoint(&mut self) {
        while self.displaced.last().is_some_and(|entry| entry.checkpoint >= self.checkpoints.len()) {
            let Some(entry) = self.displaced.pop() else { break };
            self.safe_chain.truncate(entry.index);
            self.safe_chain.extend(entry.blocks);
        }

        let checkpoint = self.last_checkpoint().clone();
        let len = usize::try_from(checkpoint.safe_head.number).map_or(usize::MAX, |n| n + 1);
        self.safe_chain.truncate(len);
        self.future = checkpoint.future;
    }

    fn last_checkpoint(&self) -> &Checkpoint {
        // the genesis checkpoint is never removed.
        &self.checkpoints[self.checkpoints.len() - 1]
    }

    /// Consumes the submissions included in the L1 block and records its checkpoint.
    fn process_l1_block<P: L1ChainProvider>(
        &mut self,
        l1: &P,
        block: &L1Block,
    ) -> Result<(), DerivationError> {
        let inbox = self.config.batch_inbox_address;
        for tx in block.transactions.iter().filter(|tx| tx.to() == inbox) {
            self.process_submission(l1, block, tx)?;
        }
        self.drain_future(l1);

        self.checkpoints.push(Checkpoint {
            l1: block.info(),
            safe_head: self.safe_head().info(),
            future: self.future.clone(),
        });
        tracing::trace!(target: "harness::derivation", l1 = %block.info(), safe_head = %self.safe_head().info(), "consumed L1 block");

        Ok(())
    }

    fn process_submission<P: L1ChainProvider>(
        &mut self,
        l1: &P,
        block: &L1Block,
        tx: &L1Transaction,
    ) -> Result<(), DerivationError> {
        let inclusion = block.info();
        let Ok(signer) = tx.recover_signer() else {
            self.record(inclusion, BatchValidity::Drop(DropReason::InvalidSignature));
            return Ok(())
        };
        let decoded = Codec::decode(tx.input());

        if !block.system_config.is_authorized_batcher(signer) {
            return self.check_unauthorized(signer, tx, inclusion, decoded.ok())
        }

        let payload = decoded.map_err(|source| DerivationError::Codec {
            tx: tx.hash(),
            l1: inclusion,
            source,
        })?;
        tracing::debug!(target: "harness::derivation", %signer, tx = %tx.hash(), l1 = %inclusion, mode = %payload.mode(), "processing submission");

        match payload {
            BatchPayload::Singular(batches) => {
                for batch in batches {
                    let validity = self.apply_batch(l1, Batch::from_singular(batch, inclusion));
                    self.record(inclusion, validity);
                }
            }
            BatchPayload::Span(span) => {
                let validity = if self.config.is_delta_active(block.timestamp) {
                    match Batch::from_span(span, inclusion, l1) {
                        Ok(batch) => self.apply_batch(l1, batch),
                        Err(reason) => BatchValidity::Drop(reason),
                    }
                } else {
                    BatchValidity::Drop(DropReason::SpanBatchNotActive)
                };
                self.record(inclusion, validity);
            }
        }

        Ok(())
    }

    /// Submissions of an unauthorized signer are discarded, unless they cover a block which is
    /// neither safe nor buffered from an earlier valid submission.
    fn check_unauthorized(
        &self,
        signer: Address,
        tx: &L1Transaction,
        inclusion: BlockInfo,
        payload: Option<BatchPayload>,
    ) -> Result<(), DerivationError> {
        let timestamps: Vec<u64> = match &payload {
            Some(BatchPayload::Singular(batches)) => {
                batches.iter().map(|batch| batch.timestamp).collect()
            }
            Some(BatchPayload::Span(span)) => (0..span.len())
                .filter_map(|i| span.timestamp_at(i, self.config.block_time))
                .collect(),
            None => Vec::new(),
        };
        let safe = self.safe_head().number();
        let uncovered = timestamps
            .into_iter()
            .filter_map(|timestamp| self.config.l2_block_number_at(timestamp))
            .find(|number| *number > safe && !self.is_buffered(*number));

        if let Some(number) = uncovered {
            return Err(DerivationError::UnauthorizedBatcher {
                signer,
                tx: tx.hash(),
                l1: inclusion,
                number,
            })
        }

        tracing::debug!(target: "harness::derivation", %signer, tx = %tx.hash(), l1 = %inclusion, "discarded submission from unauthorized batcher");
        Ok(())
    }

    fn is_buffered(&self, number: u64) -> bool {
        self.future.range(..=number).any(|(first, batch)| number < first + batch.len() as u64)
    }

    /// Applies the buffered batches which now connect to the safe chain.
    fn drain_future<P: L1ChainProvider>(&mut self, l1: &P) {
        loop {
            let next = self.safe_head().number() + 1;
            if !self.future.first_key_value().is_some_and(|(first, _)| *first <= next) {
                break
            }
            let Some((_, batch)) = self.future.pop_first() else { break };
            let inclusion = batch.inclusion;
            let validity = self.apply_batch(l1, batch);
            self.record(inclusion, validity);
        }
    }

    /// Checks the batch against the safe chain and applies it.
    fn apply_batch<P: L1ChainProvider>(&mut self, l1: &P, batch: Batch) -> BatchValidity {
        let Some(first) = batch.blocks.first() else {
            return BatchValidity::Drop(DropReason::EmptyBatch)
        };
        let Some(first_number) = self.config.l2_block_number_at(first.timestamp) else {
            return BatchValidity::Drop(DropReason::MisalignedTimestamp)
        };
        if first_number == 0 {
            return BatchValidity::Drop(DropReason::BeforeGenesis)
        }
        if first_number > self.safe_head().number() + 1 {
            // latest submission wins.
            self.future.insert(first_number, batch);
            return BatchValidity::Future
        }

        let derived = match self.derive_blocks(l1, &batch, first_number) {
            Ok(derived) => derived,
            Err(reason) => return BatchValidity::Drop(reason),
        };

        let mut validity = BatchValidity::Duplicate;
        for block in derived {
            let index = block.number() as usize;
            match self.safe_chain.get(index) {
                Some(existing) if existing.hash() == block.hash() => continue,
                Some(existing) => {
                    tracing::debug!(target: "harness::derivation", replaced = %existing.info(), by = %block.info(), "replacing safe block");
                    let blocks = self.safe_chain.split_off(index);
                    self.displaced.push(Displaced {
                        checkpoint: self.checkpoints.len(),
                        index,
                        blocks,
                    });
                    self.metrics.replaced_blocks.increment(1);
                    validity = BatchValidity::Replace;
                }
                None if validity == BatchValidity::Duplicate => validity = BatchValidity::Accept,
                None => {}
            }
            self.safe_chain.push(block);
            self.metrics.derived_blocks.increment(1);
        }

        validity
    }

    /// Derives the blocks of the batch on top of the safe block preceding `first_number`.
    fn derive_blocks<P: L1ChainProvider>(
        &self,
        l1: &P,
        batch: &Batch,
        first_number: u64,
    ) -> Result<Vec<L2Block>, DropReason> {
        let base = &self.safe_chain[first_number as usize - 1];
        if !batch.parent_check.matches(base.hash()) {
            return Err(DropReason::ParentMismatch)
        }

        let mut derived: Vec<L2Block> = Vec::with_capacity(batch.len());
        for block in &batch.blocks {
            let parent = derived.last().unwrap_or(base);
            if block.timestamp != parent.timestamp() + self.config.block_time {
                return Err(DropReason::MisalignedTimestamp)
            }
            if !l1.is_canonical(&block.epoch) {
                return Err(DropReason::NonCanonicalOrigin)
            }
            if block.epoch.number > batch.inclusion.number {
                return Err(DropReason::OriginAfterInclusion)
            }
            let parent_origin = parent.l1_origin().number;
            if block.epoch.number != parent_origin && block.epoch.number != parent_origin + 1 {
                return Err(DropReason::OriginOutOfRange)
            }
            let origin =
                l1.block_by_number(block.epoch.number).ok_or(DropReason::NonCanonicalOrigin)?;
            if block.timestamp < origin.timestamp {
                return Err(DropReason::TimestampBeforeOrigin)
            }

            let l2 = L2Block::new(
                parent.info(),
                block.timestamp,
                block.epoch,
                &origin.system_config,
                block.transactions.clone(),
            );
            derived.push(l2);
        }

        Ok(derived)
    }

    fn record(&self, inclusion: BlockInfo, validity: BatchValidity) {
        match validity {
            BatchValidity::Drop(reason) => {
                self.metrics.dropped_batches.increment(1);
                tracing::warn!(target: "harness::derivation", l1 = %inclusion, %reason, "dropped batch");
            }
            BatchValidity::Future => {
                self.metrics.future_batches.increment(1);
                tracing::debug!(target: "harness::derivation", l1 = %inclusion, "buffered future batch");
            }
            validity => {
                tracing::trace!(target: "harness::derivation", l1 = %inclusion, %validity, safe_head = %self.safe_head().info(), "applied batch");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, Bytes};
    use harness_codec::SpanBatch;
    use harness_l1::L1Chain;
    use harness_primitives::{BatchMode, SystemConfig, TxRequest};
    use harness_signer::Credential;

    const GENESIS_TIMESTAMP: u64 = 1_000;

    struct Fixture {
        l1: L1Chain,
        pipeline: DerivationPipeline,
        genesis: L2Block,
        alice: Credential,
        bob: Credential,
    }

    fn fixture(delta_time: Option<u64>) -> eyre::Result<Fixture> {
        let alice = Credential::from_seed("derivation", "alice")?;
        let bob = Credential::from_seed("derivation", "bob")?;
        let config = Arc::new(RollupConfig {
            l1_chain_id: 900,
            l2_chain_id: 901,
            genesis_timestamp: GENESIS_TIMESTAMP,
            genesis_system_config: SystemConfig::new(alice.address(), 2100, 1_000_000, 30_000_000),
            l1_block_time: 12,
            block_time: 2,
            batch_inbox_address: address!("0xff00000000000000000000000000000000000901"),
            system_config_address: address!("0x5500000000000000000000000000000000000001"),
            system_config_owner: address!("0x00000000000000000000000000000000000000dd"),
            delta_time,
            max_frame_size: 120_000,
        });
        let l1 = L1Chain::new(config.clone());
        let genesis = L2Block::genesis(
            l1.head().info(),
            GENESIS_TIMESTAMP,
            &config.genesis_system_config,
        );
        let pipeline = DerivationPipeline::new(config, genesis.clone());
        Ok(Fixture { l1, pipeline, genesis, alice, bob })
    }

    fn build(l1: &L1Chain, parent: &L2Block, count: usize) -> Vec<L2Block> {
        build_tagged(l1, parent, count, 0)
    }

    /// Builds `count` blocks on top of `parent`, adopting the next L1 block as origin as soon as
    /// its timestamp is reached. The tag is carried in the transactions of every block.
    fn build_tagged(l1: &L1Chain, parent: &L2Block, count: usize, tag: u8) -> Vec<L2Block> {
        let mut blocks: Vec<L2Block> = Vec::with_capacity(count);
        for _ in 0..count {
            let parent = blocks.last().unwrap_or(parent);
            let timestamp = parent.timestamp() + 2;
            let mut origin = l1.block_by_number(parent.l1_origin().number).unwrap();
            if let Some(next) = l1.block_by_number(origin.number + 1) {
                if next.timestamp <= timestamp {
                    origin = next;
                }
            }
            let mut tx = vec![tag];
            tx.extend_from_slice(&timestamp.to_be_bytes());
            let tx = Bytes::from(tx);
            let block =
                L2Block::new(parent.info(), timestamp, origin.info(), &origin.system_config, vec![tx]);
            blocks.push(block);
        }
        blocks
    }

    /// Queues the raw payload from the batcher.
    fn queue_payload(l1: &mut L1Chain, batcher: &Credential, input: Bytes) -> eyre::Result<()> {
        let request = TxRequest {
            chain_id: 900,
            nonce: l1.next_nonce(batcher.address()),
            to: l1.config().batch_inbox_address,
            input,
        };
        l1.submit_transaction(batcher.sign_transaction(request)?)?;
        Ok(())
    }

    fn submit(
        l1: &mut L1Chain,
        batcher: &Credential,
        mode: BatchMode,
        blocks: &[L2Block],
    ) -> eyre::Result<BlockInfo> {
        queue_payload(l1, batcher, Codec::encode(mode, blocks, 120_000)?)?;
        l1.act_l1_start_block(1)?;
        l1.act_l1_include_tx(batcher.address())?;
        Ok(l1.act_l1_end_block()?)
    }

    #[test]
    fn test_derive_singular_batches() -> eyre::Result<()> {
        let Fixture { mut l1, mut pipeline, genesis, alice, .. } = fixture(None)?;
        l1.act_empty_block()?;
        let blocks = build(&l1, &genesis, 6);
        assert_eq!(blocks[5].l1_origin().number, 1);

        let inclusion = submit(&mut l1, &alice, BatchMode::Singular, &blocks)?;
        let safe_head = pipeline.derive_to_head(&l1)?;

        assert_eq!(safe_head, blocks[5].info());
        assert_eq!(pipeline.l1_cursor(), inclusion);
        assert_eq!(pipeline.safe_chain()[1..], blocks[..]);

        Ok(())
    }

    #[test]
    fn test_derive_span_batch() -> eyre::Result<()> {
        let Fixture { mut l1, mut pipeline, genesis, alice, .. } =
            fixture(Some(GENESIS_TIMESTAMP))?;
        l1.act_empty_block()?;
        let blocks = build(&l1, &genesis, 8);

        submit(&mut l1, &alice, BatchMode::Span, &blocks)?;
        assert_eq!(pipeline.derive_to_head(&l1)?, blocks[7].info());

        Ok(())
    }

    #[test]
    fn test_span_batch_before_activation_is_dropped() -> eyre::Result<()> {
        let Fixture { mut l1, mut pipeline, genesis, alice, .. } = fixture(None)?;
        let blocks = build(&l1, &genesis, 3);

        submit(&mut l1, &alice, BatchMode::Span, &blocks)?;
        assert_eq!(pipeline.derive_to_head(&l1)?, genesis.info());

        Ok(())
    }

    #[test]
    fn test_future_batches_are_buffered() -> eyre::Result<()> {
        let Fixture { mut l1, mut pipeline, genesis, alice, .. } = fixture(None)?;
        let blocks = build(&l1, &genesis, 5);

        submit(&mut l1, &alice, BatchMode::Singular, &blocks[2..])?;
        assert_eq!(pipeline.derive_to_head(&l1)?, genesis.info());

        submit(&mut l1, &alice, BatchMode::Singular, &blocks[..2])?;
        assert_eq!(pipeline.derive_to_head(&l1)?, blocks[4].info());

        Ok(())
    }

    #[test]
    fn test_resubmission_is_idempotent() -> eyre::Result<()> {
        let Fixture { mut l1, mut pipeline, genesis, alice, bob } = fixture(None)?;
        let blocks = build(&l1, &genesis, 4);

        submit(&mut l1, &alice, BatchMode::Singular, &blocks)?;
        submit(&mut l1, &alice, BatchMode::Singular, &blocks)?;
        // covers only safe blocks, discarded.
        submit(&mut l1, &bob, BatchMode::Singular, &blocks)?;

        assert_eq!(pipeline.derive_to_head(&l1)?, blocks[3].info());
        assert_eq!(pipeline.l1_cursor().number, 3);

        Ok(())
    }

    #[test]
    fn test_unauthorized_batcher_errors_until_rewound() -> eyre::Result<()> {
        let Fixture { mut l1, mut pipeline, genesis, bob, .. } = fixture(None)?;
        let blocks = build(&l1, &genesis, 3);

        submit(&mut l1, &bob, BatchMode::Singular, &blocks)?;
        let err = pipeline.derive_to_head(&l1).unwrap_err();
        assert!(matches!(
            err,
            DerivationError::UnauthorizedBatcher { signer, number: 1, .. } if signer == bob.address()
        ));
        assert_eq!(pipeline.l1_cursor().number, 0);

        // the failing block is processed again.
        assert!(pipeline.derive_to_head(&l1).is_err());

        l1.act_l1_rewind_depth(1)?;
        l1.act_empty_block()?;
        assert_eq!(pipeline.derive_to_head(&l1)?, genesis.info());
        assert_eq!(pipeline.l1_cursor().number, 1);

        Ok(())
    }

    #[test]
    fn test_failed_l1_block_restores_replaced_safe_blocks() -> eyre::Result<()> {
        let Fixture { mut l1, mut pipeline, genesis, alice, bob } = fixture(None)?;
        let first = build(&l1, &genesis, 3);
        submit(&mut l1, &alice, BatchMode::Singular, &first)?;
        assert_eq!(pipeline.derive_to_head(&l1)?, first[2].info());

        // the same L1 block replaces the safe blocks, then carries an unauthorized batch.
        let second = build_tagged(&l1, &genesis, 4, 1);
        queue_payload(&mut l1, &alice, Codec::encode(BatchMode::Singular, &second[..3], 120_000)?)?;
        queue_payload(&mut l1, &bob, Codec::encode(BatchMode::Singular, &second[3..], 120_000)?)?;
        l1.act_l1_start_block(2)?;
        l1.act_l1_include_tx(alice.address())?;
        l1.act_l1_include_tx(bob.address())?;
        l1.act_l1_end_block()?;

        assert!(matches!(
            pipeline.derive_to_head(&l1),
            Err(DerivationError::UnauthorizedBatcher { number: 4, .. })
        ));
        assert_eq!(pipeline.l1_cursor().number, 1);
        assert_eq!(pipeline.safe_head(), &first[2]);
        assert_eq!(pipeline.safe_chain()[1..], first[..]);

        Ok(())
    }

    #[test]
    fn test_reorg_restores_replaced_safe_blocks() -> eyre::Result<()> {
        let Fixture { mut l1, mut pipeline, genesis, alice, .. } = fixture(None)?;
        let first = build(&l1, &genesis, 3);
        submit(&mut l1, &alice, BatchMode::Singular, &first)?;
        let second = build_tagged(&l1, &genesis, 3, 1);
        submit(&mut l1, &alice, BatchMode::Singular, &second)?;
        assert_eq!(pipeline.derive_to_head(&l1)?, second[2].info());

        l1.act_l1_rewind_depth(1)?;
        l1.act_empty_block()?;

        assert_eq!(pipeline.derive_to_head(&l1)?, first[2].info());
        assert_eq!(pipeline.safe_chain()[1..], first[..]);

        Ok(())
    }

    #[test]
    fn test_overflowing_span_timestamps_do_not_panic() -> eyre::Result<()> {
        let Fixture { mut l1, mut pipeline, genesis, alice, bob } =
            fixture(Some(GENESIS_TIMESTAMP))?;
        let blocks = build(&l1, &genesis, 2);
        let mut span = SpanBatch::try_from_blocks(&blocks)?;
        span.timestamp = u64::MAX;
        let payload = Codec::encode_payload(&BatchPayload::Span(span), 120_000)?;

        // dropped from the authorized batcher, discarded from an unauthorized one.
        queue_payload(&mut l1, &alice, payload.clone())?;
        queue_payload(&mut l1, &bob, payload)?;
        l1.act_l1_start_block(2)?;
        l1.act_l1_include_tx(alice.address())?;
        l1.act_l1_include_tx(bob.address())?;
        l1.act_l1_end_block()?;

        assert_eq!(pipeline.derive_to_head(&l1)?, genesis.info());
        assert_eq!(pipeline.l1_cursor().number, 1);

        Ok(())
    }

    #[test]
    fn test_undecodable_submission_from_batcher_errors() -> eyre::Result<()> {
        let Fixture { mut l1, mut pipeline, alice, .. } = fixture(None)?;
        let request = TxRequest {
            chain_id: 900,
            nonce: 0,
            to: l1.config().batch_inbox_address,
            input: Bytes::from_static(&[9, 9, 9]),
        };
        l1.submit_transaction(alice.sign_transaction(request)?)?;
        l1.act_l1_start_block(1)?;
        l1.act_l1_include_tx(alice.address())?;
        l1.act_l1_end_block()?;

        assert!(matches!(pipeline.derive_to_head(&l1), Err(DerivationError::Codec { .. })));

        Ok(())
    }

    #[test]
    fn test_reorg_resets_to_canonical_checkpoint() -> eyre::Result<()> {
        let Fixture { mut l1, mut pipeline, genesis, alice, .. } = fixture(None)?;
        let first = build(&l1, &genesis, 2);
        submit(&mut l1, &alice, BatchMode::Singular, &first)?;
        let second = build(&l1, &first[1], 2);
        submit(&mut l1, &alice, BatchMode::Singular, &second)?;
        assert_eq!(pipeline.derive_to_head(&l1)?, second[1].info());

        l1.act_l1_rewind_depth(1)?;
        l1.act_empty_block()?;
        l1.act_empty_block()?;

        assert_eq!(pipeline.derive_to_head(&l1)?, first[1].info());
        assert_eq!(pipeline.l1_cursor(), l1.head().info());

        Ok(())
    }
}
