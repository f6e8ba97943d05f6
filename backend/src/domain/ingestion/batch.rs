//! Bounded batch accumulation for bulk customer writes.
//!
//! Peak memory is O(capacity), not O(input size): the buffer never holds
//! more than `BATCH_SIZE` drafts before it is flushed as one atomic
//! persistence call.

use tracing::info;

use crate::domain::customer::CustomerDraft;
use crate::domain::ports::{CustomerPersistenceError, CustomerRepository};

/// Records accumulated before a flush.
pub const BATCH_SIZE: usize = 1000;

/// Accumulates validated drafts and flushes them in fixed-size batches.
pub struct BatchWriter<'a, R: CustomerRepository + ?Sized> {
    repository: &'a R,
    buffer: Vec<CustomerDraft>,
    capacity: usize,
}

impl<'a, R: CustomerRepository + ?Sized> BatchWriter<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self::with_capacity(repository, BATCH_SIZE)
    }

    pub fn with_capacity(repository: &'a R, capacity: usize) -> Self {
        Self {
            repository,
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a draft, flushing first the moment the buffer is full.
    ///
    /// Returns the number of rows flushed, zero when the draft was only
    /// buffered. A flush failure is the whole batch's failure; the buffer
    /// is dropped either way so one bad batch cannot wedge the job.
    pub async fn add(&mut self, draft: CustomerDraft) -> Result<u64, CustomerPersistenceError> {
        self.buffer.push(draft);
        if self.buffer.len() >= self.capacity {
            return self.flush().await;
        }
        Ok(0)
    }

    /// Persist whatever is buffered; a no-op on an empty buffer.
    pub async fn flush(&mut self) -> Result<u64, CustomerPersistenceError> {
        if self.buffer.is_empty() {
            return Ok(0);
        }
        let batch = std::mem::take(&mut self.buffer);
        let written = self.repository.insert_batch(&batch).await?;
        info!(rows = written, "flushed customer batch");
        Ok(written)
    }

    /// Number of drafts currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
