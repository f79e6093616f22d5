//! # batchflow
//!
//! **Batchflow** collects records one at a time and ships them to a
//! partitioned downstream ingestion service in bounded batches, from a single
//! background worker, with backpressure, per-record retries, and exponential
//! backoff.
//!
//! ## Features
//!
//! | Area              | Description                                                             | Key types / traits                       |
//! |-------------------|-------------------------------------------------------------------------|------------------------------------------|
//! | **Submission**    | Stage records with a partition key; block or fail when the buffer fills. | [`Producer::submit`], [`Config`]         |
//! | **Lifecycle**     | Start/stop with worker rendezvous; draining flush with deadline.         | [`Producer::start`], [`Producer::flush`] |
//! | **Sink**          | Transport-agnostic batch delivery seam.                                  | [`RecordSink`], [`BatchOutput`]          |
//! | **Retries**       | Per-record attempt budget; capped exponential backoff, optional jitter.  | [`BackoffPolicy`], [`JitterPolicy`]      |
//! | **Observability** | Event stream plus periodic stats snapshots.                              | [`Event`], [`StatReceiver`]              |
//! | **Errors**        | Typed construction, lifecycle, and submission errors.                    | [`ConfigError`], [`ProducerError`]       |
//!
//! The buffer is volatile: nothing survives a process restart. Dispatch is
//! single-flight, and retried records re-enter the buffer at the tail, so
//! ordering across retries is best-effort only.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use batchflow::{BatchOutput, Config, Producer, Record, RecordSink, SinkError};
//!
//! struct StdoutSink;
//!
//! #[async_trait]
//! impl RecordSink for StdoutSink {
//!     async fn put_batch(&self, records: &[Record]) -> Result<BatchOutput, SinkError> {
//!         println!("shipping {} records", records.len());
//!         Ok(BatchOutput::all_ok())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let producer = Producer::new(Arc::new(StdoutSink), Config::default())?;
//!     producer.start().await?;
//!
//!     producer.submit(b"hello".to_vec(), "user-1").await?;
//!     producer.submit(b"world".to_vec(), "user-2").await?;
//!
//!     let report = producer.flush(Duration::from_secs(5), false).await?;
//!     println!("sent={} remaining={}", report.sent, report.remaining);
//!     Ok(())
//! }
//! ```
//!
//! ---

mod buffer;
mod config;
mod core;
mod error;
mod events;
mod policies;
mod producer;
mod record;
mod sink;
mod stats;

// ---- Public re-exports ----

pub use config::{Config, MAX_BATCH_SIZE, MIN_FLUSH_INTERVAL};
pub use error::{ConfigError, ProducerError};
pub use events::{Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use producer::{FlushReport, Producer};
pub use record::Record;
pub use sink::{BatchOutput, RecordResult, RecordSink, SinkError, SinkRef};
pub use stats::{StatReceiver, StatsSnapshot};
