//! # Error types returned by the producer.
//!
//! Two enums cover the caller-facing failure surface:
//!
//! - [`ConfigError`] construction-time validation failures.
//! - [`ProducerError`] lifecycle and submission failures.
//!
//! Both provide `as_label` helpers returning stable snake_case labels for
//! logs and metrics. Downstream failures never appear here: they are absorbed
//! by the retry/backoff machinery and observable only through the event
//! stream, logs, and stats snapshots.

use std::time::Duration;

use thiserror::Error;

use crate::config::{MAX_BATCH_SIZE, MIN_FLUSH_INTERVAL};

/// Configuration rejected by [`Producer::new`](crate::Producer::new).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `batch_size` outside `1..=MAX_BATCH_SIZE`.
    #[error("batch_size must be between 1 and {} inclusive, got {got}", MAX_BATCH_SIZE)]
    BatchSizeOutOfRange {
        /// The rejected value.
        got: usize,
    },

    /// `buffer_size` of zero cannot hold any record.
    #[error("buffer_size must be greater than zero")]
    ZeroBufferSize,

    /// A buffer smaller than one batch with no periodic flush would fill up
    /// and block every submitter forever.
    #[error(
        "buffer_size {buffer_size} is smaller than batch_size {batch_size} and flush_interval \
         is disabled; the buffer would fill up and submit would block forever"
    )]
    BufferSmallerThanBatch {
        /// The configured buffer capacity.
        buffer_size: usize,
        /// The configured batch size.
        batch_size: usize,
    },

    /// A nonzero flush interval below the minimum cadence.
    #[error("flush_interval must be zero or at least {:?}, got {got:?}", MIN_FLUSH_INTERVAL)]
    FlushIntervalTooShort {
        /// The rejected interval.
        got: Duration,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::BatchSizeOutOfRange { .. } => "config_batch_size_out_of_range",
            ConfigError::ZeroBufferSize => "config_zero_buffer_size",
            ConfigError::BufferSmallerThanBatch { .. } => "config_buffer_smaller_than_batch",
            ConfigError::FlushIntervalTooShort { .. } => "config_flush_interval_too_short",
        }
    }
}

/// Lifecycle and submission failures.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProducerError {
    /// `start` was called while the worker is already running.
    #[error("producer is already started")]
    AlreadyStarted,

    /// `stop` was called while no worker is running.
    #[error("producer is already stopped")]
    AlreadyStopped,

    /// `submit` was called on a stopped producer.
    ///
    /// Rejecting the record up front keeps callers from blocking on a buffer
    /// that no worker is draining.
    #[error("producer is not running")]
    NotRunning,

    /// The buffer is full and the producer is configured not to block.
    #[error("buffer is full")]
    BufferFull,
}

impl ProducerError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProducerError::AlreadyStarted => "producer_already_started",
            ProducerError::AlreadyStopped => "producer_already_stopped",
            ProducerError::NotRunning => "producer_not_running",
            ProducerError::BufferFull => "producer_buffer_full",
        }
    }
}
