//! Observer port for ingestion progress notifications.

use tracing::info;

/// Receives periodic progress notifications from a running ingestion job.
///
/// This is a monitoring hook, not a correctness requirement; implementations
/// must be cheap and must not fail.
#[cfg_attr(test, mockall::automock)]
pub trait IngestionProgress: Send + Sync {
    /// Called after every progress interval with the running row count.
    fn rows_processed(&self, count: u64);
}

/// Default observer that reports progress through structured logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl IngestionProgress for TracingProgress {
    fn rows_processed(&self, count: u64) {
        info!(rows = count, "bulk ingestion progress");
    }
}
