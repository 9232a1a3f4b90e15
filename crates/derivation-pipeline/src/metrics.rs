use metrics::Counter;
use metrics_derive::Metrics;

/// The metrics for the [`super::DerivationPipeline`].
#[derive(Metrics, Clone)]
#[metrics(scope = "derivation_pipeline")]
pub struct DerivationPipelineMetrics {
    /// A counter on the derived L2 blocks.
    pub derived_blocks: Counter,
    /// A counter on the safe L2 blocks replaced by a later submission.
    pub replaced_blocks: Counter,
    /// A counter on the dropped batches.
    pub dropped_batches: Counter,
    /// A counter on the batches buffered for later.
    pub future_batches: Counter,
    /// A counter on the resets following an L1 reorg.
    pub resets: Counter,
}
