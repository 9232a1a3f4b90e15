use alloy_primitives::{Address, B256};
use harness_codec::CodecError;
use harness_primitives::BlockInfo;

/// A fatal error occurred during the derivation process.
#[derive(Debug, thiserror::Error)]
pub enum DerivationError {
    /// A batch from an unauthorized signer covers a block which is not yet safe.
    #[error("batch {tx} in L1 block {l1} is signed by unauthorized batcher {signer} and covers unsafe L2 block {number}")]
    UnauthorizedBatcher {
        /// The recovered signer.
        signer: Address,
        /// The submission transaction hash.
        tx: B256,
        /// The L1 block including the submission.
        l1: BlockInfo,
        /// The first L2 block covered by the batch which is not yet safe.
        number: u64,
    },
    /// A batch from the authorized batcher could not be decoded.
    #[error("failed to decode batch {tx} in L1 block {l1}: {source}")]
    Codec {
        /// The submission transaction hash.
        tx: B256,
        /// The L1 block including the submission.
        l1: BlockInfo,
        /// The codec error.
        #[source]
        source: CodecError,
    },
    /// A canonical L1 block is missing.
    #[error("missing canonical L1 block {0}")]
    MissingL1Block(u64),
}
