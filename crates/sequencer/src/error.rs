use harness_primitives::BlockInfo;

/// An error type for the sequencer.
#[derive(Debug, thiserror::Error)]
pub enum SequencerError {
    /// The sequencer cannot build while derivation is errored.
    #[error("cannot build while derivation is errored")]
    Errored,
    /// The signalled L1 head is no longer canonical.
    #[error("signalled L1 head {0} is no longer canonical")]
    StaleL1Head(BlockInfo),
    /// A canonical L1 block is missing.
    #[error("missing canonical L1 block {0}")]
    MissingL1Block(u64),
}
