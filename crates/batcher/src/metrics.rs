use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::Batcher`].
#[derive(Metrics, Clone)]
#[metrics(scope = "batcher")]
pub struct BatcherMetrics {
    /// A counter on the submitted transactions.
    pub submissions: Counter,
    /// A counter on the submitted L2 blocks.
    pub submitted_blocks: Counter,
    /// A histogram of the submission payload sizes.
    pub payload_size: Histogram,
    /// A counter on the watermark rewinds.
    pub watermark_rewinds: Counter,
}
