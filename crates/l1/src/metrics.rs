use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::L1Chain`].
#[derive(Metrics, Clone)]
#[metrics(scope = "l1_chain")]
pub struct L1ChainMetrics {
    /// A counter on the sealed blocks.
    pub blocks: Counter,
    /// A counter on the included transactions.
    pub included_transactions: Counter,
    /// A counter on the transactions rejected at inclusion.
    pub rejected_transactions: Counter,
    /// A counter on the reorgs.
    pub reorgs: Counter,
    /// A histogram of reorgs depth.
    pub reorg_depths: Histogram,
}
