use alloy_primitives::{Bytes, FixedBytes, B256};
use harness_codec::{SingularBatch, SpanBatch};
use harness_l1::L1ChainProvider;
use harness_primitives::BlockInfo;

/// The check applied to the parent of the first block of a [`Batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentCheck {
    /// The full parent hash.
    Hash(B256),
    /// The first 20 bytes of the parent hash.
    Prefix(FixedBytes<20>),
}

impl ParentCheck {
    /// Returns true if the hash passes the check.
    pub fn matches(&self, hash: B256) -> bool {
        match self {
            Self::Hash(expected) => *expected == hash,
            Self::Prefix(prefix) => prefix.as_slice() == &hash[..20],
        }
    }
}

/// A block carried by a [`Batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchBlock {
    /// The block timestamp.
    pub timestamp: u64,
    /// The L1 origin of the block.
    pub epoch: BlockInfo,
    /// The block transactions.
    pub transactions: Vec<Bytes>,
}

/// A contiguous run of L2 blocks extracted from a submission.
///
/// A singular batch yields a single block, a span batch the whole range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// The L1 block which included the submission.
    pub inclusion: BlockInfo,
    /// The check on the parent of the first block.
    pub parent_check: ParentCheck,
    /// The blocks, each one extending the previous one.
    pub blocks: Vec<BatchBlock>,
}

impl Batch {
    /// Returns the [`Batch`] for a singular batch.
    pub fn from_singular(batch: SingularBatch, inclusion: BlockInfo) -> Self {
        let epoch = batch.epoch();
        Self {
            inclusion,
            parent_check: ParentCheck::Hash(batch.parent_hash),
            blocks: vec![BatchBlock {
                timestamp: batch.timestamp,
                epoch,
                transactions: batch.transactions,
            }],
        }
    }

    /// Returns the [`Batch`] for a span batch, resolving the origin hashes from the canonical L1
    /// chain.
    pub fn from_span<P: L1ChainProvider>(
        span: SpanBatch,
        inclusion: BlockInfo,
        l1: &P,
    ) -> Result<Self, DropReason> {
        let block_time = l1.config().block_time;
        let blocks = span
            .elements
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let hash = l1
                    .block_by_number(element.epoch_num)
                    .map(|block| block.hash)
                    .unwrap_or_default();
                Ok(BatchBlock {
                    timestamp: span
                        .timestamp_at(i, block_time)
                        .ok_or(DropReason::MisalignedTimestamp)?,
                    epoch: BlockInfo::new(element.epoch_num, hash),
                    transactions: element.transactions.clone(),
                })
            })
            .collect::<Result<Vec<_>, DropReason>>()?;

        let last = blocks.last().ok_or(DropReason::EmptyBatch)?;
        if !span.check_l1_origin(last.epoch.hash) {
            return Err(DropReason::OriginCheckMismatch)
        }

        Ok(Self { inclusion, parent_check: ParentCheck::Prefix(span.parent_check), blocks })
    }

    /// Returns the number of blocks in the batch.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if the batch carries no block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// The outcome of checking a batch against the safe chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BatchValidity {
    /// The batch extends the safe chain.
    #[display("accept")]
    Accept,
    /// The batch only carries blocks identical to safe blocks.
    #[display("duplicate")]
    Duplicate,
    /// The batch replaced safe blocks.
    #[display("replace")]
    Replace,
    /// The batch does not connect to the safe chain yet and is buffered.
    #[display("future")]
    Future,
    /// The batch is dropped.
    #[display("drop: {_0}")]
    Drop(DropReason),
}

/// The reason a batch is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum DropReason {
    /// The batch carries no block.
    #[display("empty batch")]
    EmptyBatch,
    /// The submission signature could not be recovered.
    #[display("invalid signature")]
    InvalidSignature,
    /// A span batch was included before span batches are accepted.
    #[display("span batch before activation")]
    SpanBatchNotActive,
    /// The origin of the last block of a span batch does not match its check.
    #[display("origin check mismatch")]
    OriginCheckMismatch,
    /// A block timestamp is not aligned on the L2 block time.
    #[display("misaligned timestamp")]
    MisalignedTimestamp,
    /// The batch targets the genesis block.
    #[display("batch before genesis")]
    BeforeGenesis,
    /// The first block does not extend the safe block it should follow.
    #[display("parent mismatch")]
    ParentMismatch,
    /// A block origin is not canonical.
    #[display("non canonical origin")]
    NonCanonicalOrigin,
    /// A block origin is after the L1 block including the batch.
    #[display("origin after inclusion")]
    OriginAfterInclusion,
    /// A block origin is neither the parent origin nor its successor.
    #[display("origin out of range")]
    OriginOutOfRange,
    /// A block timestamp is before the timestamp of its origin.
    #[display("timestamp before origin")]
    TimestampBeforeOrigin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_check() {
        let hash = B256::repeat_byte(0xab);
        let mut other = hash;
        other.0[31] = 0;

        assert!(ParentCheck::Hash(hash).matches(hash));
        assert!(!ParentCheck::Hash(hash).matches(other));

        let prefix = ParentCheck::Prefix(FixedBytes::from_slice(&hash[..20]));
        assert!(prefix.matches(hash));
        assert!(prefix.matches(other));
        assert!(!prefix.matches(B256::ZERO));
    }
}
