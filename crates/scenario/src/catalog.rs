//! The built-in scenarios, each run once per [`BatchMode`].

use crate::{
    Action, Actor, Assertion, DeployParams, Scenario, ScenarioError, ScenarioReport, Step,
};

use harness_primitives::BatchMode;

/// The capacity of the L1 blocks opened by the built-in scenarios.
const L1_BLOCK_CAPACITY: usize = 12;

/// The L1 fee overhead set by [`gpo_params_change`].
pub const UPDATED_GAS_OVERHEAD: u64 = 2300;

/// The L1 fee scalar set by [`gpo_params_change`].
pub const UPDATED_GAS_SCALAR: u64 = 1_100_000;

/// The gas limit set by [`gas_limit_change`].
pub const UPDATED_GAS_LIMIT: u64 = 40_000_000;

/// Returns the steps including the next queued transaction of the actor in a new L1 block.
pub fn include(actor: Actor) -> [Step; 3] {
    [
        Step::Act(Action::L1StartBlock(L1_BLOCK_CAPACITY)),
        Step::Act(Action::L1IncludeTx(actor)),
        Step::Act(Action::L1EndBlock),
    ]
}

/// Returns the steps building to the L1 head, batching with the actor and deriving the submission.
pub fn submit_and_sync(actor: Actor) -> Vec<Step> {
    let mut steps = vec![
        Step::Act(Action::L1HeadSignal),
        Step::Act(Action::BuildToL1Head),
        Step::Act(Action::SubmitAll(actor)),
    ];
    steps.extend(include(actor));
    steps.extend([
        Step::Act(Action::PipelineFull),
        Step::Check(Assertion::NoDerivationError),
        Step::Check(Assertion::SafeEqualsUnsafe),
    ]);
    steps
}

/// The batcher is rotated from alice to bob, then the rotation is reorged out of L1.
///
/// Alice batches again after the reorg and is the only batcher whose submissions derive, while
/// bob's late submission covers blocks that are already safe.
pub fn batcher_key_rotation() -> Scenario {
    Scenario::new("batcher-key-rotation")
        .act(Action::EmptyBlock)
        .steps(submit_and_sync(Actor::Alice))
        .act(Action::SetBatcher { owner: Actor::SysCfgOwner, batcher: Actor::Bob })
        .steps(include(Actor::SysCfgOwner))
        .act(Action::L1HeadSignal)
        .act(Action::BuildToL1Head)
        .check(Assertion::AuthorizedBatcher(Actor::Bob))
        .act(Action::SubmitAll(Actor::Bob))
        .steps(include(Actor::Bob))
        .act(Action::PipelineFull)
        .check(Assertion::NoDerivationError)
        .check(Assertion::SafeEqualsUnsafe)
        // reorg out every L1 block, including the rotation, then refill the chain.
        .act(Action::EmptyBlock)
        .act(Action::L1RewindDepth(5))
        .steps([Step::Act(Action::EmptyBlock); 6])
        .act(Action::L1HeadSignal)
        .act(Action::PipelineFull)
        .check(Assertion::NoDerivationError)
        .check(Assertion::AuthorizedBatcher(Actor::Alice))
        .act(Action::BuildToL1Head)
        .act(Action::SubmitAll(Actor::Alice))
        .steps(include(Actor::Alice))
        .act(Action::PipelineFull)
        .check(Assertion::NoDerivationError)
        .check(Assertion::SafeEqualsUnsafe)
        .check(Assertion::SafeHeadOrigin(6))
        .act(Action::SubmitAll(Actor::Bob))
        .steps(include(Actor::Bob))
        .act(Action::PipelineFull)
        .check(Assertion::NoDerivationError)
        .check(Assertion::SafeEqualsUnsafe)
        .check(Assertion::BatchersDistinct(Actor::Alice, Actor::Bob))
}

/// The L1 fee parameters are updated and adopted by the next derived blocks.
pub fn gpo_params_change() -> Scenario {
    let (overhead, scalar) = (UPDATED_GAS_OVERHEAD, UPDATED_GAS_SCALAR);
    Scenario::new("gpo-params-change")
        .act(Action::EmptyBlock)
        .steps(submit_and_sync(Actor::Alice))
        .check(Assertion::SafeHeadGasConfig {
            overhead: harness_primitives::DEFAULT_GAS_OVERHEAD,
            scalar: harness_primitives::DEFAULT_GAS_SCALAR,
        })
        .act(Action::SetGasConfig { owner: Actor::SysCfgOwner, overhead, scalar })
        .steps(include(Actor::SysCfgOwner))
        .steps(submit_and_sync(Actor::Alice))
        .check(Assertion::SafeHeadOrigin(3))
        .check(Assertion::SafeHeadGasConfig { overhead, scalar })
}

/// The L2 block gas limit is updated and adopted by the next derived blocks.
pub fn gas_limit_change() -> Scenario {
    Scenario::new("gas-limit-change")
        .act(Action::EmptyBlock)
        .steps(submit_and_sync(Actor::Alice))
        .check(Assertion::SafeHeadGasLimit(harness_primitives::DEFAULT_GAS_LIMIT))
        .act(Action::SetGasLimit { owner: Actor::SysCfgOwner, gas_limit: UPDATED_GAS_LIMIT })
        .steps(include(Actor::SysCfgOwner))
        .steps(submit_and_sync(Actor::Alice))
        .check(Assertion::SafeHeadOrigin(3))
        .check(Assertion::SafeHeadGasLimit(UPDATED_GAS_LIMIT))
}

/// Returns every built-in scenario.
pub fn all() -> Vec<Scenario> {
    vec![batcher_key_rotation(), gpo_params_change(), gas_limit_change()]
}

/// Returns the built-in scenario with the provided name.
pub fn find(name: &str) -> Option<Scenario> {
    all().into_iter().find(|scenario| scenario.name() == name)
}

/// A scenario bound to a batch mode and the deploy parameters of that mode.
#[derive(Debug, Clone)]
pub struct ScenarioVariant {
    /// The scenario.
    pub scenario: Scenario,
    /// The batch mode.
    pub mode: BatchMode,
    /// The deploy parameters.
    pub params: DeployParams,
}

impl ScenarioVariant {
    /// Returns the variant of the scenario for the mode. Span batches are accepted from genesis in
    /// span mode and never in singular mode.
    pub fn new(scenario: Scenario, mode: BatchMode, params: &DeployParams) -> Self {
        let offset = match mode {
            BatchMode::Singular => None,
            BatchMode::Span => Some(0),
        };
        Self { scenario, mode, params: params.with_delta_time_offset(offset) }
    }

    /// Runs the variant.
    pub fn run(&self) -> Result<ScenarioReport, ScenarioError> {
        self.scenario.run(&self.params, self.mode)
    }
}

/// Returns one variant of the scenario per batch mode.
pub fn variants(scenario: &Scenario, params: &DeployParams) -> Vec<ScenarioVariant> {
    BatchMode::ALL
        .into_iter()
        .map(|mode| ScenarioVariant::new(scenario.clone(), mode, params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_names_are_unique() {
        let mut names = all().iter().map(|scenario| scenario.name().to_string()).collect::<Vec<_>>();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), all().len());
        assert!(find("batcher-key-rotation").is_some());
        assert!(find("unknown").is_none());
    }

    #[test]
    fn test_key_rotation_rewinds_five_and_refills_six() {
        let steps = batcher_key_rotation().step_list().to_vec();
        let rewind = steps
            .iter()
            .position(|step| *step == Step::Act(Action::L1RewindDepth(5)))
            .expect("rewind step");
        assert!(steps[rewind + 1..rewind + 7].iter().all(|step| *step == Step::Act(Action::EmptyBlock)));
        assert_ne!(steps[rewind + 7], Step::Act(Action::EmptyBlock));
    }

    #[test]
    fn test_variants_cover_every_mode() -> Result<(), crate::SetupError> {
        let params = DeployParams::new(Default::default())?;
        let variants = variants(&batcher_key_rotation(), &params);

        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].params.rollup_config().delta_time, None);
        assert_eq!(variants[1].mode, BatchMode::Span);
        assert!(variants[1].params.rollup_config().delta_time.is_some());
        Ok(())
    }
}
