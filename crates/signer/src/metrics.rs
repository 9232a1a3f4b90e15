use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::Credential`].
#[derive(Metrics, Clone)]
#[metrics(scope = "signer")]
pub struct SignerMetrics {
    /// A counter on the signed transactions.
    pub signed_transactions: Counter,
    /// The signing duration.
    pub signing_duration: Histogram,
}
