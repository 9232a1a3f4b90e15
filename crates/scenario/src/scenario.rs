use crate::{ActionHarness, Actor, DeployParams, HarnessError, ScenarioError};

use harness_primitives::{BatchMode, BlockInfo};
use harness_sequencer::SequencerState;
use std::fmt;

/// An action on one of the components of the [`ActionHarness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Action {
    /// Opens an L1 block holding at most the provided number of transactions.
    #[display("l1-start-block({_0})")]
    L1StartBlock(usize),
    /// Includes the oldest queued transaction of the actor in the open L1 block.
    #[display("l1-include-tx({_0})")]
    L1IncludeTx(Actor),
    /// Seals the open L1 block.
    #[display("l1-end-block")]
    L1EndBlock,
    /// Removes the provided number of L1 blocks from the tip.
    #[display("l1-rewind-depth({_0})")]
    L1RewindDepth(u64),
    /// Seals an empty L1 block.
    #[display("l1-empty-block")]
    EmptyBlock,
    /// Signals the L1 head to the sequencer.
    #[display("l1-head-signal")]
    L1HeadSignal,
    /// Builds the unsafe chain to the signalled L1 head.
    #[display("build-to-l1-head")]
    BuildToL1Head,
    /// Runs the derivation pipeline to the L1 head.
    #[display("pipeline-full")]
    PipelineFull,
    /// Submits every new unsafe block with the batcher of the actor.
    #[display("submit-all({_0})")]
    SubmitAll(Actor),
    /// Queues a system config update authorizing the batcher.
    #[display("set-batcher({owner}, {batcher})")]
    SetBatcher {
        /// The signer of the update.
        owner: Actor,
        /// The new batcher.
        batcher: Actor,
    },
    /// Queues a system config update of the L1 fee parameters.
    #[display("set-gas-config({owner}, {overhead}, {scalar})")]
    SetGasConfig {
        /// The signer of the update.
        owner: Actor,
        /// The fee overhead.
        overhead: u64,
        /// The fee scalar.
        scalar: u64,
    },
    /// Queues a system config update of the L2 block gas limit.
    #[display("set-gas-limit({owner}, {gas_limit})")]
    SetGasLimit {
        /// The signer of the update.
        owner: Actor,
        /// The gas limit.
        gas_limit: u64,
    },
}

/// A check on the state of the [`ActionHarness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Assertion {
    /// The last derivation run succeeded.
    #[display("no-derivation-error")]
    NoDerivationError,
    /// The last derivation run failed.
    #[display("derivation-errored")]
    DerivationErrored,
    /// The safe head is the unsafe head.
    #[display("safe-equals-unsafe")]
    SafeEqualsUnsafe,
    /// The origin of the safe head is the L1 block with the provided number.
    #[display("safe-head-origin({_0})")]
    SafeHeadOrigin(u64),
    /// The safe head number is at least the provided number.
    #[display("safe-head-at-least({_0})")]
    SafeHeadAtLeast(u64),
    /// The batchers of the two actors have different identities.
    #[display("batchers-distinct({_0}, {_1})")]
    BatchersDistinct(Actor, Actor),
    /// The actor is the batcher authorized at the L1 head.
    #[display("authorized-batcher({_0})")]
    AuthorizedBatcher(Actor),
    /// The safe head carries the provided gas limit.
    #[display("safe-head-gas-limit({_0})")]
    SafeHeadGasLimit(u64),
    /// The safe head carries the provided L1 fee parameters.
    #[display("safe-head-gas-config({overhead}, {scalar})")]
    SafeHeadGasConfig {
        /// The fee overhead.
        overhead: u64,
        /// The fee scalar.
        scalar: u64,
    },
}

/// A step of a [`Scenario`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum Step {
    /// Performs an action.
    #[display("{_0}")]
    Act(Action),
    /// Checks an assertion.
    #[display("check {_0}")]
    Check(Assertion),
}

/// The position of a scenario failure.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Position {
    /// The harness setup, before the first step.
    #[display("setup")]
    Setup,
    /// A step of the scenario.
    #[display("step {index} ({step})")]
    Step {
        /// The index of the step.
        index: usize,
        /// The rendered step.
        step: String,
    },
}

/// A named, ordered sequence of steps run against a fresh [`ActionHarness`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    name: String,
    steps: Vec<Step>,
}

impl Scenario {
    /// Returns a new empty [`Scenario`].
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), steps: Vec::new() }
    }

    /// Appends an action.
    pub fn act(mut self, action: Action) -> Self {
        self.steps.push(Step::Act(action));
        self
    }

    /// Appends an assertion.
    pub fn check(mut self, assertion: Assertion) -> Self {
        self.steps.push(Step::Check(assertion));
        self
    }

    /// Appends the steps.
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Returns the name of the scenario.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the steps of the scenario.
    pub fn step_list(&self) -> &[Step] {
        &self.steps
    }

    /// Runs the scenario on a fresh harness, stopping at the first failing step.
    ///
    /// A derivation error is a failure of the [`Action::PipelineFull`] step that produced it,
    /// unless the next step checks for [`Assertion::DerivationErrored`].
    pub fn run(
        &self,
        params: &DeployParams,
        mode: BatchMode,
    ) -> Result<ScenarioReport, ScenarioError> {
        let span = tracing::info_span!(target: "harness::scenario", "scenario", name = %self.name, %mode);
        let _guard = span.enter();

        let fail = |position: Position, source: HarnessError| {
            tracing::error!(target: "harness::scenario", %position, %source, "scenario failed");
            ScenarioError { scenario: self.name.clone(), mode, position, source }
        };

        let mut harness = ActionHarness::new(params, mode)
            .map_err(|err| fail(Position::Setup, HarnessError::Setup(err)))?;

        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!(target: "harness::scenario", index, %step, "running step");
            let result = match step {
                Step::Act(action) => harness.act(action).and_then(|()| {
                    if *action != Action::PipelineFull || self.expects_derivation_error(index) {
                        return Ok(())
                    }
                    match harness.sequencer().error() {
                        Some(err) => Err(HarnessError::Derivation(err.to_string())),
                        None => Ok(()),
                    }
                }),
                Step::Check(assertion) => harness.check(assertion).map_err(HarnessError::from),
            };
            result.map_err(|source| {
                fail(Position::Step { index, step: step.to_string() }, source)
            })?;
        }

        let report = harness.report(&self.name);
        tracing::info!(target: "harness::scenario", %report, "scenario passed");
        Ok(report)
    }

    fn expects_derivation_error(&self, index: usize) -> bool {
        matches!(self.steps.get(index + 1), Some(Step::Check(Assertion::DerivationErrored)))
    }
}

/// The final state of a passed scenario run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    /// The scenario name.
    pub scenario: String,
    /// The batch mode of the run.
    pub mode: BatchMode,
    /// The L1 head.
    pub l1_head: BlockInfo,
    /// The unsafe L2 head.
    pub unsafe_head: BlockInfo,
    /// The safe L2 head.
    pub safe_head: BlockInfo,
    /// The sequencer state.
    pub state: SequencerState,
    /// The error of the last derivation run.
    pub derivation_error: Option<String>,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: l1 head {}, unsafe head {}, safe head {}, state {}",
            self.scenario, self.mode, self.l1_head, self.unsafe_head, self.safe_head, self.state
        )?;
        if let Some(err) = &self.derivation_error {
            write!(f, ", derivation error: {err}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        let position =
            Position::Step { index: 3, step: Step::Act(Action::L1RewindDepth(5)).to_string() };
        assert_eq!(position.to_string(), "step 3 (l1-rewind-depth(5))");
        assert_eq!(Position::Setup.to_string(), "setup");
    }

    #[test]
    fn test_step_display() {
        let set = Action::SetBatcher { owner: Actor::SysCfgOwner, batcher: Actor::Bob };
        assert_eq!(Step::from(set).to_string(), "set-batcher(sys-cfg-owner, bob)");
        assert_eq!(
            Step::from(Assertion::BatchersDistinct(Actor::Alice, Actor::Bob)).to_string(),
            "check batchers-distinct(alice, bob)"
        );
    }

    #[test]
    fn test_derivation_error_expectation() {
        let scenario = Scenario::new("expect")
            .act(Action::PipelineFull)
            .check(Assertion::DerivationErrored)
            .act(Action::PipelineFull);
        assert!(scenario.expects_derivation_error(0));
        assert!(!scenario.expects_derivation_error(2));
    }
}
