//! Scripted scenarios driving the L1 chain, the system config, the batchers and the sequencer
//! through an [`ActionHarness`].
//!
//! A [`Scenario`] is a list of [`Step`]s run in order against a fresh harness. The run stops at
//! the first failing step, and the returned [`ScenarioError`] carries its [`Position`].

mod config;
pub use config::{
    Actor, DeployConfig, DeployParams, Secrets, DEFAULT_BATCH_INBOX_ADDRESS,
    DEFAULT_GENESIS_TIMESTAMP, DEFAULT_L1_CHAIN_ID, DEFAULT_L2_CHAIN_ID, DEFAULT_SEED,
    DEFAULT_SYSTEM_CONFIG_ADDRESS,
};

mod error;
pub use error::{AssertionError, HarnessError, ScenarioError, SetupError};

mod harness;
pub use harness::ActionHarness;

mod scenario;
pub use scenario::{Action, Assertion, Position, Scenario, ScenarioReport, Step};

pub mod catalog;
