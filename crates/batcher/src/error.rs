use harness_codec::CodecError;
use harness_l1::L1ChainError;
use harness_signer::SignerError;

/// An error that occurred while submitting batches.
#[derive(Debug, thiserror::Error)]
pub enum BatcherError {
    /// The blocks could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The submission could not be signed.
    #[error(transparent)]
    Signer(#[from] SignerError),
    /// The submission was rejected by the L1 chain.
    #[error(transparent)]
    L1(#[from] L1ChainError),
    /// An unsafe block of the range is missing from the L2 source.
    #[error("missing unsafe L2 block {0}")]
    MissingBlock(u64),
}
