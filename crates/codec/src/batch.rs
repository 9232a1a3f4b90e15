use crate::error::EncodingError;

use alloy_primitives::{Bytes, FixedBytes, B256};
use alloy_rlp::{RlpDecodable, RlpEncodable};
use harness_primitives::{BlockInfo, L2Block};

/// A batch carrying a single L2 block.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct SingularBatch {
    /// The hash of the parent L2 block.
    pub parent_hash: B256,
    /// The number of the L1 origin.
    pub epoch_num: u64,
    /// The hash of the L1 origin.
    pub epoch_hash: B256,
    /// The timestamp of the L2 block.
    pub timestamp: u64,
    /// The transactions of the L2 block.
    pub transactions: Vec<Bytes>,
}

impl SingularBatch {
    /// Returns the [`SingularBatch`] for the provided block.
    pub fn from_block(block: &L2Block) -> Self {
        let origin = block.l1_origin();
        Self {
            parent_hash: block.parent_hash(),
            epoch_num: origin.number,
            epoch_hash: origin.hash,
            timestamp: block.timestamp(),
            transactions: block.transactions().to_vec(),
        }
    }

    /// Returns the L1 origin of the batch.
    pub const fn epoch(&self) -> BlockInfo {
        BlockInfo { number: self.epoch_num, hash: self.epoch_hash }
    }
}

/// The per block data of a [`SpanBatch`].
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct SpanBatchElement {
    /// The number of the L1 origin of the block.
    pub epoch_num: u64,
    /// The transactions of the block.
    pub transactions: Vec<Bytes>,
}

/// A batch carrying a contiguous range of L2 blocks.
///
/// Parent and origin hashes are truncated to 20 bytes. Only the timestamp of the first block is
/// carried, the following blocks are spaced by the L2 block time.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct SpanBatch {
    /// The first 20 bytes of the hash of the parent of the first block.
    pub parent_check: FixedBytes<20>,
    /// The first 20 bytes of the hash of the L1 origin of the last block.
    pub l1_origin_check: FixedBytes<20>,
    /// The timestamp of the first block.
    pub timestamp: u64,
    /// The blocks of the range.
    pub elements: Vec<SpanBatchElement>,
}

impl SpanBatch {
    /// Returns the [`SpanBatch`] covering `blocks`.
    ///
    /// The blocks must be contiguous, each one extending the previous one, with a uniform block
    /// time.
    pub fn try_from_blocks(blocks: &[L2Block]) -> Result<Self, EncodingError> {
        let (first, last) = match (blocks.first(), blocks.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(EncodingError::EmptyBatch),
        };

        let mut spacing = None;
        for pair in blocks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.number() != prev.number() + 1 {
                return Err(EncodingError::NonContiguousRange {
                    expected: prev.number() + 1,
                    got: next.number(),
                })
            }
            if next.parent_hash() != prev.hash() {
                return Err(EncodingError::ParentMismatch(next.number()))
            }
            let delta = next.timestamp().checked_sub(prev.timestamp());
            match (spacing, delta) {
                (_, None) | (_, Some(0)) => {
                    return Err(EncodingError::NonUniformTimestamps(next.number()))
                }
                (None, Some(delta)) => spacing = Some(delta),
                (Some(expected), Some(delta)) if expected != delta => {
                    return Err(EncodingError::NonUniformTimestamps(next.number()))
                }
                _ => {}
            }
        }

        Ok(Self {
            parent_check: truncate(first.parent_hash()),
            l1_origin_check: truncate(last.l1_origin().hash),
            timestamp: first.timestamp(),
            elements: blocks
                .iter()
                .map(|block| SpanBatchElement {
                    epoch_num: block.l1_origin().number,
                    transactions: block.transactions().to_vec(),
                })
                .collect(),
        })
    }

    /// Returns true if `hash` matches the parent check of the batch.
    pub fn check_parent(&self, hash: B256) -> bool {
        self.parent_check == truncate(hash)
    }

    /// Returns true if `hash` matches the L1 origin check of the batch.
    pub fn check_l1_origin(&self, hash: B256) -> bool {
        self.l1_origin_check == truncate(hash)
    }

    /// Returns the timestamp of the block at `index` in the range, or [`None`] if it overflows.
    pub fn timestamp_at(&self, index: usize, block_time: u64) -> Option<u64> {
        u64::try_from(index).ok()?.checked_mul(block_time)?.checked_add(self.timestamp)
    }

    /// Returns the number of blocks in the range.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the range is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn truncate(hash: B256) -> FixedBytes<20> {
    FixedBytes::from_slice(&hash[..20])
}
