use crate::{
    Action, Actor, Assertion, AssertionError, DeployParams, HarnessError, ScenarioReport, Secrets,
    SetupError,
};

use alloy_primitives::{B256, U256};
use harness_batcher::{Batcher, BatcherConfig};
use harness_l1::{L1Chain, L1ChainProvider, SystemConfigMutator};
use harness_primitives::{BatchMode, BlockInfo, RollupConfig};
use harness_sequencer::{Sequencer, SequencerState};
use std::{collections::BTreeMap, sync::Arc};

/// The owner of every component of a scenario run.
///
/// Every action is a method returning a [`Result`], so a run holds no ambient state.
#[derive(Debug)]
pub struct ActionHarness {
    /// The rollup config.
    config: Arc<RollupConfig>,
    /// The actor credentials.
    secrets: Secrets,
    /// The batch mode of the batchers.
    mode: BatchMode,
    /// The simulated L1 chain.
    l1: L1Chain,
    /// The sequencer.
    sequencer: Sequencer,
    /// The system config mutator.
    mutator: SystemConfigMutator,
    /// The batchers, created on their first submission.
    batchers: BTreeMap<Actor, Batcher>,
}

impl ActionHarness {
    /// Returns a new [`ActionHarness`] at genesis.
    pub fn new(params: &DeployParams, mode: BatchMode) -> Result<Self, SetupError> {
        let config = Arc::new(params.rollup_config());
        let l1 = L1Chain::new(config.clone());
        let sequencer = Sequencer::new(config.clone(), &l1, l1.subscribe())?;
        let mutator = SystemConfigMutator::new(&config);
        tracing::debug!(target: "harness::scenario", %mode, ?config, "set up harness");

        Ok(Self {
            config,
            secrets: params.secrets().clone(),
            mode,
            l1,
            sequencer,
            mutator,
            batchers: BTreeMap::new(),
        })
    }

    /// Returns the rollup config.
    pub fn config(&self) -> &RollupConfig {
        &self.config
    }

    /// Returns the batch mode of the batchers.
    pub const fn mode(&self) -> BatchMode {
        self.mode
    }

    /// Returns the simulated L1 chain.
    pub const fn l1(&self) -> &L1Chain {
        &self.l1
    }

    /// Returns the sequencer.
    pub const fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Returns the batcher of the actor, if it submitted at least once.
    pub fn batcher(&self, actor: Actor) -> Option<&Batcher> {
        self.batchers.get(&actor)
    }

    /// Returns the actor credentials.
    pub const fn secrets(&self) -> &Secrets {
        &self.secrets
    }

    /// Performs the action.
    pub fn act(&mut self, action: &Action) -> Result<(), HarnessError> {
        match *action {
            Action::L1StartBlock(capacity) => self.act_l1_start_block(capacity)?,
            Action::L1IncludeTx(actor) => {
                self.act_l1_include_tx(actor)?;
            }
            Action::L1EndBlock => {
                self.act_l1_end_block()?;
            }
            Action::L1RewindDepth(depth) => {
                self.act_l1_rewind_depth(depth)?;
            }
            Action::EmptyBlock => {
                self.act_empty_block()?;
            }
            Action::L1HeadSignal => {
                self.act_l1_head_signal();
            }
            Action::BuildToL1Head => {
                self.act_build_to_l1_head()?;
            }
            Action::PipelineFull => {
                self.act_l2_pipeline_full();
            }
            Action::SubmitAll(actor) => {
                self.act_submit_all(actor)?;
            }
            Action::SetBatcher { owner, batcher } => {
                self.act_set_batcher(owner, batcher)?;
            }
            Action::SetGasConfig { owner, overhead, scalar } => {
                self.act_set_gas_config(owner, overhead, scalar)?;
            }
            Action::SetGasLimit { owner, gas_limit } => {
                self.act_set_gas_limit(owner, gas_limit)?;
            }
        }
        Ok(())
    }

    /// Opens an L1 block.
    pub fn act_l1_start_block(&mut self, capacity: usize) -> Result<(), HarnessError> {
        Ok(self.l1.act_l1_start_block(capacity)?)
    }

    /// Includes the oldest queued transaction of the actor.
    pub fn act_l1_include_tx(&mut self, actor: Actor) -> Result<B256, HarnessError> {
        Ok(self.l1.act_l1_include_tx(self.secrets.address(actor))?)
    }

    /// Seals the open L1 block.
    pub fn act_l1_end_block(&mut self) -> Result<BlockInfo, HarnessError> {
        Ok(self.l1.act_l1_end_block()?)
    }

    /// Removes the last `depth` L1 blocks.
    pub fn act_l1_rewind_depth(&mut self, depth: u64) -> Result<BlockInfo, HarnessError> {
        Ok(self.l1.act_l1_rewind_depth(depth)?)
    }

    /// Seals an empty L1 block.
    pub fn act_empty_block(&mut self) -> Result<BlockInfo, HarnessError> {
        Ok(self.l1.act_empty_block()?)
    }

    /// Signals the L1 head to the sequencer.
    pub fn act_l1_head_signal(&mut self) -> BlockInfo {
        self.sequencer.act_l1_head_signal()
    }

    /// Builds the unsafe chain to the signalled L1 head.
    pub fn act_build_to_l1_head(&mut self) -> Result<usize, HarnessError> {
        Ok(self.sequencer.act_build_to_l1_head(&self.l1)?)
    }

    /// Runs the derivation pipeline to the L1 head.
    pub fn act_l2_pipeline_full(&mut self) -> SequencerState {
        self.sequencer.act_l2_pipeline_full(&self.l1)
    }

    /// Submits every new unsafe block with the batcher of the actor.
    pub fn act_submit_all(&mut self, actor: Actor) -> Result<Option<B256>, HarnessError> {
        let batcher = self.batchers.entry(actor).or_insert_with(|| {
            Batcher::new(
                self.secrets.credential(actor).clone(),
                BatcherConfig::new(&self.config, self.mode),
            )
        });
        Ok(batcher.submit_all(&self.sequencer, &mut self.l1)?)
    }

    /// Queues a system config update authorizing the batcher.
    pub fn act_set_batcher(&mut self, owner: Actor, batcher: Actor) -> Result<B256, HarnessError> {
        Ok(self.mutator.set_batcher_credential(
            &mut self.l1,
            self.secrets.credential(owner),
            self.secrets.credential(batcher),
        )?)
    }

    /// Queues a system config update of the L1 fee parameters.
    pub fn act_set_gas_config(
        &mut self,
        owner: Actor,
        overhead: u64,
        scalar: u64,
    ) -> Result<B256, HarnessError> {
        Ok(self.mutator.set_gas_config(
            &mut self.l1,
            self.secrets.credential(owner),
            overhead,
            scalar,
        )?)
    }

    /// Queues a system config update of the L2 block gas limit.
    pub fn act_set_gas_limit(&mut self, owner: Actor, gas_limit: u64) -> Result<B256, HarnessError> {
        Ok(self.mutator.set_gas_limit(&mut self.l1, self.secrets.credential(owner), gas_limit)?)
    }

    /// Checks the assertion against the current state.
    pub fn check(&self, assertion: &Assertion) -> Result<(), AssertionError> {
        let safe_head = self.sequencer.safe_head();
        match *assertion {
            Assertion::NoDerivationError => {
                if let Some(err) = self.sequencer.error() {
                    return Err(AssertionError::UnexpectedDerivationError(err.to_string()))
                }
            }
            Assertion::DerivationErrored => {
                if self.sequencer.error().is_none() {
                    return Err(AssertionError::MissingDerivationError)
                }
            }
            Assertion::SafeEqualsUnsafe => {
                let unsafe_head = self.sequencer.unsafe_head();
                if safe_head != unsafe_head {
                    return Err(AssertionError::SafeUnsafeMismatch {
                        safe: safe_head.info(),
                        unsafe_head: unsafe_head.info(),
                    })
                }
            }
            Assertion::SafeHeadOrigin(expected) => {
                let got = safe_head.l1_origin().number;
                if got != expected {
                    return Err(AssertionError::SafeHeadOrigin { expected, got })
                }
            }
            Assertion::SafeHeadAtLeast(expected) => {
                let got = safe_head.number();
                if got < expected {
                    return Err(AssertionError::SafeHeadBelow { expected, got })
                }
            }
            Assertion::BatchersDistinct(a, b) => {
                let batcher_a = self.batcher(a).ok_or(AssertionError::UnknownBatcher(a))?;
                let batcher_b = self.batcher(b).ok_or(AssertionError::UnknownBatcher(b))?;
                if batcher_a.credential() == batcher_b.credential() {
                    return Err(AssertionError::BatchersNotDistinct(a, b))
                }
            }
            Assertion::AuthorizedBatcher(actor) => {
                let config = self.l1.head().system_config;
                if !config.is_authorized_batcher(self.secrets.address(actor)) {
                    return Err(AssertionError::UnauthorizedBatcher {
                        actor,
                        authorized: config.batcher_address(),
                    })
                }
            }
            Assertion::SafeHeadGasLimit(expected) => {
                let got = safe_head.system_config().gas_limit;
                if got != expected {
                    return Err(AssertionError::GasLimit { expected, got })
                }
            }
            Assertion::SafeHeadGasConfig { overhead, scalar } => {
                let config = safe_head.system_config();
                let (expected_overhead, expected_scalar) = (U256::from(overhead), U256::from(scalar));
                if config.overhead != expected_overhead || config.scalar != expected_scalar {
                    return Err(AssertionError::GasConfig {
                        expected_overhead,
                        expected_scalar,
                        overhead: config.overhead,
                        scalar: config.scalar,
                    })
                }
            }
        }
        Ok(())
    }
}

impl ActionHarness {
    /// Returns the report of the current state.
    pub fn report(&self, scenario: &str) -> ScenarioReport {
        ScenarioReport {
            scenario: scenario.to_string(),
            mode: self.mode,
            l1_head: self.l1.head().info(),
            unsafe_head: self.sequencer.unsafe_head().info(),
            safe_head: self.sequencer.safe_head().info(),
            state: self.sequencer.state(),
            derivation_error: self.sequencer.error().map(ToString::to_string),
        }
    }
}
