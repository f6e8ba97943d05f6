//! Bulk customer ingestion orchestration.
//!
//! The orchestrator drives the pipeline: row source → extractor →
//! duplicate check → batch writer, while tracking counters and per-row
//! error messages. Row-scoped failures are recorded and skipped, never
//! fatal; only a stream-level failure stops iteration, and even then the
//! caller receives the partial report rather than an error. A failed batch
//! flush never stops iteration either, but any flush failure makes the
//! job finish failed.

mod batch;
mod extractor;
mod job;
mod report;


pub use batch::{BATCH_SIZE, BatchWriter};
pub use extractor::RowError;
pub use job::{IngestionJobs, IngestionOutcome, JobSnapshot, JobStatus};
pub use report::IngestionReport;

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::customer::CustomerDraft;
use crate::domain::ports::{
    CustomerRepository, IngestionProgress, RowSource, SheetRow, WorkbookDecoder,
};

/// Rows between progress notifications.
const PROGRESS_INTERVAL: u64 = 10_000;

/// Domain service implementing the bulk ingestion pipeline.
///
/// Row processing is strictly sequential within one job; concurrency, if
/// any, happens across jobs and is backstopped by the persistence layer's
/// uniqueness constraints.
pub struct BulkIngestionService<R> {
    repository: Arc<R>,
    progress: Arc<dyn IngestionProgress>,
}

impl<R> BulkIngestionService<R>
where
    R: CustomerRepository,
{
    /// Create a new ingestion service.
    pub fn new(repository: Arc<R>, progress: Arc<dyn IngestionProgress>) -> Self {
        Self {
            repository,
            progress,
        }
    }

    /// Decode an uploaded payload and ingest its rows.
    ///
    /// Runs entirely inside the job, so the submitting request never pays
    /// for the decode. A payload that cannot be decoded fails the job with
    /// an empty report and a single job-level error, the same way a stream
    /// break on the first read would.
    pub async fn ingest_payload(
        &self,
        decoder: &dyn WorkbookDecoder,
        payload: Vec<u8>,
    ) -> IngestionOutcome {
        match decoder.open(payload) {
            Ok(rows) => self.run(rows).await,
            Err(err) => {
                error!(%err, "upload payload could not be decoded");
                let mut report = IngestionReport::default();
                report
                    .job_errors
                    .push(format!("Error processing file: {err}"));
                IngestionOutcome {
                    report,
                    completed: false,
                }
            }
        }
    }

    /// Walk the row sequence to exhaustion and assemble the final report.
    pub async fn run(&self, mut rows: Box<dyn RowSource>) -> IngestionOutcome {
        let mut report = IngestionReport::default();
        let mut writer = BatchWriter::new(self.repository.as_ref());
        let mut completed = true;

        loop {
            match rows.next_row() {
                Ok(Some(row)) => {
                    report.total_processed += 1;
                    let row_number = report.total_processed;

                    match self.process_row(&row).await {
                        Ok(draft) => {
                            // The row counts as a success once extracted; a
                            // later flush failure is the batch's failure.
                            report.success_count += 1;
                            if let Err(err) = writer.add(draft).await {
                                error!(row = row_number, %err, "batch flush failed");
                                report
                                    .job_errors
                                    .push(format!("Error persisting batch: {err}"));
                                completed = false;
                            }
                        }
                        Err(row_error) => {
                            report.record_row_error(row_number, &row_error.to_string());
                        }
                    }

                    if report.total_processed % PROGRESS_INTERVAL == 0 {
                        self.progress.rows_processed(report.total_processed);
                    }
                }
                Ok(None) => break,
                Err(stream_error) => {
                    error!(%stream_error, "row stream failed; finishing with partial report");
                    report
                        .job_errors
                        .push(format!("Error processing file: {stream_error}"));
                    completed = false;
                    break;
                }
            }
        }

        if let Err(err) = writer.flush().await {
            error!(%err, "final batch flush failed");
            report
                .job_errors
                .push(format!("Error persisting batch: {err}"));
            completed = false;
        }

        info!(
            total = report.total_processed,
            success = report.success_count,
            failed = report.failure_count(),
            "bulk ingestion finished"
        );
        IngestionOutcome { report, completed }
    }

    /// Validate one row in the fixed order: name, NIC, duplicate, date.
    ///
    /// The duplicate check is point-in-time: two rows of the same upload
    /// sharing a NIC both pass if neither has been flushed yet, and the
    /// database uniqueness constraint rejects the batch instead.
    async fn process_row(&self, row: &SheetRow) -> Result<CustomerDraft, RowError> {
        let fields = extractor::mandatory_fields(row)?;
        let exists = self
            .repository
            .exists_by_nic(&fields.nic_number)
            .await
            .map_err(|err| RowError::NicLookup {
                message: err.to_string(),
            })?;
        if exists {
            return Err(RowError::DuplicateNic {
                nic: fields.nic_number,
            });
        }
        fields.into_draft()
    }
}
