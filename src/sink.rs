//! # Downstream sink contract.
//!
//! The producer is agnostic to transport: anything that can deliver a batch
//! of records and report the outcome per record implements [`RecordSink`].
//! A call either fails wholly with a [`SinkError`] or returns a
//! [`BatchOutput`] whose result vector is positionally aligned with the
//! input batch.
//!
//! The producer never interprets error codes; they are carried through to
//! events and logs verbatim.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::Record;

/// Shared handle to a sink object.
pub type SinkRef = Arc<dyn RecordSink>;

/// Batch delivery seam between the producer and the ingestion service.
///
/// At most one `put_batch` call is in flight at any time; implementations do
/// not need to be re-entrant, only `Send + Sync`.
#[async_trait]
pub trait RecordSink: Send + Sync + 'static {
    /// Delivers `records` downstream in one request.
    ///
    /// Return `Err` only when the whole batch failed (transport error,
    /// rejected request). Per-record failures belong in the returned
    /// [`BatchOutput`].
    async fn put_batch(&self, records: &[Record]) -> Result<BatchOutput, SinkError>;
}

/// Outcome of a whole-batch delivery that reached the service.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    /// Number of records that failed; `None` means the whole batch succeeded.
    pub failed_count: Option<usize>,
    /// Per-record results, positionally aligned with the input batch.
    ///
    /// May be empty when `failed_count` is `None`.
    pub records: Vec<RecordResult>,
}

impl BatchOutput {
    /// Output for a batch in which every record succeeded.
    pub fn all_ok() -> Self {
        Self::default()
    }

    /// Output built from per-record results; computes `failed_count`.
    pub fn from_results(records: Vec<RecordResult>) -> Self {
        let failed = records.iter().filter(|r| r.is_failed()).count();
        Self {
            failed_count: (failed > 0).then_some(failed),
            records,
        }
    }
}

/// Result the sink reports for one record of a batch.
#[derive(Debug, Clone, Default)]
pub struct RecordResult {
    /// Service-specific error code, if the record failed.
    pub error_code: Option<String>,
    /// Human-readable error message, if the record failed.
    pub error_message: Option<String>,
}

impl RecordResult {
    /// A successfully delivered record.
    pub fn ok() -> Self {
        Self::default()
    }

    /// A failed record with the service's code and message.
    pub fn failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: Some(code.into()),
            error_message: Some(message.into()),
        }
    }

    /// Whether this result marks the record as failed.
    pub fn is_failed(&self) -> bool {
        self.error_code.is_some() || self.error_message.is_some()
    }
}

/// Whole-batch delivery failure.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SinkError {
    message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
