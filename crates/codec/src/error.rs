/// An error occurring during the codec process.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// An error occurring at the encoding stage.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// An error occurring at the decoding stage.
    #[error(transparent)]
    Decoding(#[from] DecodingError),
}

/// An error occurring during the encoding.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("no blocks to encode")]
    EmptyBatch,
    #[error("non contiguous block range: expected block {expected}, got {got}")]
    NonContiguousRange { expected: u64, got: u64 },
    #[error("block {0} does not extend the previous block of the range")]
    ParentMismatch(u64),
    #[error("block {0} breaks the uniform block time of the range")]
    NonUniformTimestamps(u64),
    #[error("encoded payload of {size} bytes exceeds the maximum frame size of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },
    #[error("failed to compress payload: {0}")]
    Compression(std::io::Error),
}

/// An error occurring during the decoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodingError {
    #[error("missing batch version in input")]
    MissingVersion,
    #[error("unsupported batch version {0}")]
    UnsupportedVersion(u8),
    #[error("failed to decompress payload: {0}")]
    Decompression(std::io::Error),
    #[error(transparent)]
    Rlp(#[from] alloy_rlp::Error),
    #[error("{0} trailing bytes after batch data")]
    TrailingBytes(usize),
    #[error("payload contains no batch")]
    EmptyPayload,
}
