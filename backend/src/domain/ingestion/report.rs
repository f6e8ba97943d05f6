//! The aggregate outcome of one ingestion job.

use serde::Serialize;
use utoipa::ToSchema;

/// Outcome report assembled by the orchestrator and returned to whoever
/// holds the job handle. Immutable once the job completes; never persisted.
///
/// ## Invariants
/// - `success_count + errors.len() == total_processed`
/// - `failure_count()` is derived, never stored
/// - job-level failures (batch flushes, stream breaks, undecodable
///   payloads) live in `job_errors`, distinct from the row-scoped `errors`
///   list, and do not retroactively reduce `success_count`
/// - any `job_errors` entry makes the job finish failed, whether the flush
///   that failed was mid-run or final
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    /// Count of data rows seen (header excluded).
    pub total_processed: u64,
    /// Rows that extracted cleanly and were handed to the batch writer.
    pub success_count: u64,
    /// Ordered row-scoped error messages, one per failed row.
    pub errors: Vec<String>,
    /// Job-level failures: one entry per failed batch flush or stream break.
    /// Never attributed back to individual rows.
    pub job_errors: Vec<String>,
}

impl IngestionReport {
    /// Rows that failed extraction or the duplicate check.
    pub fn failure_count(&self) -> u64 {
        self.total_processed - self.success_count
    }

    /// Record one failed row.
    pub(crate) fn record_row_error(&mut self, row_number: u64, message: &str) {
        self.errors
            .push(format!("Error processing row {row_number}: {message}"));
    }
}
