use metrics::{Counter, Gauge};
use metrics_derive::Metrics;

/// The metrics for the [`super::Sequencer`].
#[derive(Metrics, Clone)]
#[metrics(scope = "sequencer")]
pub struct SequencerMetrics {
    /// A counter on the built unsafe blocks.
    pub built_blocks: Counter,
    /// A counter on the unsafe blocks dropped after an L1 reorg or replaced by safe blocks.
    pub dropped_unsafe_blocks: Counter,
    /// A counter on the failed derivation runs.
    pub derivation_errors: Counter,
    /// The unsafe head number.
    pub unsafe_head: Gauge,
    /// The safe head number.
    pub safe_head: Gauge,
}
