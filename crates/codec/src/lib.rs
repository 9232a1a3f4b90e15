//! The batch codec of the derivation harness.
//!
//! A payload is a version byte followed by the zstd compressed RLP body of the batch data.

pub use batch::{SingularBatch, SpanBatch, SpanBatchElement};
mod batch;

pub use error::{CodecError, DecodingError, EncodingError};
mod error;

use alloy_primitives::Bytes;
use alloy_rlp::Decodable;
use harness_primitives::{BatchMode, L2Block};

/// The version byte of a singular batch payload.
pub const SINGULAR_BATCH_VERSION: u8 = 0;

/// The version byte of a span batch payload.
pub const SPAN_BATCH_VERSION: u8 = 1;

/// The zstd compression level used for payloads.
const COMPRESSION_LEVEL: i32 = 3;

/// The decoded content of a batch submission.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub enum BatchPayload {
    /// A sequence of singular batches.
    Singular(Vec<SingularBatch>),
    /// A span batch.
    Span(SpanBatch),
}

impl BatchPayload {
    /// Returns the [`BatchMode`] of the payload.
    pub const fn mode(&self) -> BatchMode {
        match self {
            Self::Singular(_) => BatchMode::Singular,
            Self::Span(_) => BatchMode::Span,
        }
    }
}

/// The Codec.
#[derive(Debug)]
pub struct Codec;

impl Codec {
    /// Encodes the blocks using the provided mode, returning the submission payload.
    pub fn encode(
        mode: BatchMode,
        blocks: &[L2Block],
        max_frame_size: usize,
    ) -> Result<Bytes, CodecError> {
        if blocks.is_empty() {
            return Err(EncodingError::EmptyBatch.into())
        }

        let payload = match mode {
            BatchMode::Singular => {
                BatchPayload::Singular(blocks.iter().map(SingularBatch::from_block).collect())
            }
            BatchMode::Span => BatchPayload::Span(SpanBatch::try_from_blocks(blocks)?),
        };
        Self::encode_payload(&payload, max_frame_size)
    }

    /// Encodes an already built [`BatchPayload`], returning the submission payload.
    pub fn encode_payload(
        payload: &BatchPayload,
        max_frame_size: usize,
    ) -> Result<Bytes, CodecError> {
        let (version, body) = match payload {
            BatchPayload::Singular(batches) => (SINGULAR_BATCH_VERSION, alloy_rlp::encode(batches)),
            BatchPayload::Span(span) => (SPAN_BATCH_VERSION, alloy_rlp::encode(span)),
        };

        let compressed =
            zstd::encode_all(body.as_slice(), COMPRESSION_LEVEL).map_err(EncodingError::Compression)?;
        let mut payload = Vec::with_capacity(compressed.len() + 1);
        payload.push(version);
        payload.extend_from_slice(&compressed);

        if payload.len() > max_frame_size {
            return Err(EncodingError::PayloadTooLarge { size: payload.len(), max: max_frame_size }
                .into())
        }

        Ok(payload.into())
    }

    /// Decodes the input data and returns the [`BatchPayload`].
    pub fn decode(input: &[u8]) -> Result<BatchPayload, CodecError> {
        let (version, compressed) = input.split_first().ok_or(DecodingError::MissingVersion)?;
        if !matches!(*version, SINGULAR_BATCH_VERSION | SPAN_BATCH_VERSION) {
            return Err(DecodingError::UnsupportedVersion(*version).into())
        }

        let body = zstd::decode_all(compressed).map_err(DecodingError::Decompression)?;
        let buf = &mut body.as_slice();

        let payload = match *version {
            SINGULAR_BATCH_VERSION => {
                let batches = Vec::<SingularBatch>::decode(buf).map_err(DecodingError::from)?;
                if batches.is_empty() {
                    return Err(DecodingError::EmptyPayload.into())
                }
                BatchPayload::Singular(batches)
            }
            _ => {
                let span = SpanBatch::decode(buf).map_err(DecodingError::from)?;
                if span.is_empty() {
                    return Err(DecodingError::EmptyPayload.into())
                }
                BatchPayload::Span(span)
            }
        };

        if !buf.is_empty() {
            return Err(DecodingError::TrailingBytes(buf.len()).into())
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::bytes;
    use harness_primitives::{L1Block, SystemConfig};

    fn chain(len: u64) -> Vec<L2Block> {
        let config = SystemConfig::default();
        let l1 = L1Block::genesis(0, config);
        let mut parent = L2Block::genesis(l1.info(), 0, &config);
        (1..=len)
            .map(|n| {
                let block = L2Block::new(parent.info(), n * 2, l1.info(), &config, vec![]);
                parent = block.clone();
                block
            })
            .collect()
    }

    #[test]
    fn test_singular_payload_decodes_to_blocks() -> eyre::Result<()> {
        let blocks = chain(4);
        let payload = Codec::encode(BatchMode::Singular, &blocks, 120_000)?;
        assert_eq!(payload[0], SINGULAR_BATCH_VERSION);

        let BatchPayload::Singular(batches) = Codec::decode(&payload)? else {
            panic!("expected singular payload")
        };
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[3].parent_hash, blocks[2].hash());

        Ok(())
    }

    #[test]
    fn test_span_payload_decodes_to_range() -> eyre::Result<()> {
        let blocks = chain(4);
        let payload = Codec::encode(BatchMode::Span, &blocks, 120_000)?;
        assert_eq!(payload[0], SPAN_BATCH_VERSION);

        let decoded = Codec::decode(&payload)?;
        assert_eq!(decoded.mode(), BatchMode::Span);
        assert_eq!(decoded, BatchPayload::Span(SpanBatch::try_from_blocks(&blocks)?));

        Ok(())
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let blocks = chain(4);
        let err = Codec::encode(BatchMode::Singular, &blocks, 8).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Encoding(EncodingError::PayloadTooLarge { max: 8, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert!(matches!(
            Codec::decode(&[]),
            Err(CodecError::Decoding(DecodingError::MissingVersion))
        ));
        assert!(matches!(
            Codec::decode(&[7, 1, 2]),
            Err(CodecError::Decoding(DecodingError::UnsupportedVersion(7)))
        ));
        assert!(matches!(
            Codec::decode(&bytes!("00deadbeef")),
            Err(CodecError::Decoding(DecodingError::Decompression(_)))
        ));
    }
}
