use crate::{Actor, Position};

use alloy_primitives::{Address, U256};
use harness_batcher::BatcherError;
use harness_l1::{L1ChainError, SystemConfigError};
use harness_primitives::{BatchMode, BlockInfo};
use harness_sequencer::SequencerError;
use harness_signer::SignerError;
use std::path::PathBuf;

/// An error occurring while setting up a scenario.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// A block time is zero.
    #[error("block times must be non zero")]
    ZeroBlockTime,
    /// The L2 block time is greater than the L1 block time.
    #[error("L2 block time {l2} exceeds L1 block time {l1}")]
    L2BlockTimeExceedsL1 {
        /// The L2 block time.
        l2: u64,
        /// The L1 block time.
        l1: u64,
    },
    /// The maximum frame size is zero.
    #[error("max frame size must be non zero")]
    ZeroFrameSize,
    /// The L1 and L2 chain ids are equal.
    #[error("L1 and L2 chain ids are both {0}")]
    EqualChainIds(u64),
    /// The batch inbox is the system config contract.
    #[error("batch inbox {0} is the system config address")]
    InboxIsSystemConfig(Address),
    /// An actor credential is invalid.
    #[error(transparent)]
    Credential(#[from] SignerError),
    /// The sequencer could not be created.
    #[error(transparent)]
    Sequencer(#[from] SequencerError),
    /// The deploy configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file path.
        path: PathBuf,
        /// The io error.
        #[source]
        source: std::io::Error,
    },
    /// The deploy configuration could not be parsed.
    #[error("invalid deploy config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A failed assertion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssertionError {
    /// Derivation errored while no error was expected.
    #[error("unexpected derivation error: {0}")]
    UnexpectedDerivationError(String),
    /// Derivation succeeded while an error was expected.
    #[error("expected a derivation error")]
    MissingDerivationError,
    /// The safe head is not the unsafe head.
    #[error("safe head {safe} differs from unsafe head {unsafe_head}")]
    SafeUnsafeMismatch {
        /// The safe head.
        safe: BlockInfo,
        /// The unsafe head.
        unsafe_head: BlockInfo,
    },
    /// The safe head has an unexpected origin.
    #[error("safe head origin is L1 block {got}, expected {expected}")]
    SafeHeadOrigin {
        /// The expected origin number.
        expected: u64,
        /// The origin number.
        got: u64,
    },
    /// The safe head is below the expected number.
    #[error("safe head is {got}, expected at least {expected}")]
    SafeHeadBelow {
        /// The minimum number.
        expected: u64,
        /// The safe head number.
        got: u64,
    },
    /// Two actors share the same batcher identity.
    #[error("batchers {0} and {1} share the same identity")]
    BatchersNotDistinct(Actor, Actor),
    /// The actor has never submitted, so it has no batcher.
    #[error("{0} has no batcher")]
    UnknownBatcher(Actor),
    /// The actor is not the batcher authorized at the L1 head.
    #[error("{actor} is not the authorized batcher, {authorized} is")]
    UnauthorizedBatcher {
        /// The actor.
        actor: Actor,
        /// The authorized batcher.
        authorized: Address,
    },
    /// The safe head has an unexpected gas limit.
    #[error("safe head gas limit is {got}, expected {expected}")]
    GasLimit {
        /// The expected gas limit.
        expected: u64,
        /// The gas limit.
        got: u64,
    },
    /// The safe head has an unexpected gas config.
    #[error("safe head gas config is ({overhead}, {scalar}), expected ({expected_overhead}, {expected_scalar})")]
    GasConfig {
        /// The expected overhead.
        expected_overhead: U256,
        /// The expected scalar.
        expected_scalar: U256,
        /// The overhead.
        overhead: U256,
        /// The scalar.
        scalar: U256,
    },
}

/// An error occurring while acting on the [`crate::ActionHarness`].
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The harness could not be set up.
    #[error("setup failure: {0}")]
    Setup(#[from] SetupError),
    /// An L1 action failed.
    #[error("inclusion failure: {0}")]
    Inclusion(#[from] L1ChainError),
    /// Derivation errored.
    #[error("derivation failure: {0}")]
    Derivation(String),
    /// An assertion failed.
    #[error("assertion failure: {0}")]
    Assertion(#[from] AssertionError),
    /// A batcher failed to submit.
    #[error("batcher failure: {0}")]
    Batcher(#[from] BatcherError),
    /// A system config update failed.
    #[error("system config failure: {0}")]
    SystemConfig(#[from] SystemConfigError),
    /// A sequencer action failed.
    #[error("sequencer failure: {0}")]
    Sequencer(#[from] SequencerError),
}

/// A failed scenario run.
#[derive(Debug, thiserror::Error)]
#[error("scenario {scenario} [{mode}] failed at {position}: {source}")]
pub struct ScenarioError {
    /// The scenario name.
    pub scenario: String,
    /// The batch mode of the run.
    pub mode: BatchMode,
    /// The failing position.
    pub position: Position,
    /// The failure.
    #[source]
    pub source: HarnessError,
}
