//! # Producer configuration.
//!
//! [`Config`] defines batching, buffering, flushing, retry, and stats
//! behavior. Construction via [`Producer::new`](crate::Producer::new)
//! validates the constraint table and fails with a [`ConfigError`]; it
//! performs no I/O and does not start the worker.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use batchflow::Config;
//!
//! let mut cfg = Config::default();
//! cfg.batch_size = 25;
//! cfg.flush_interval = Duration::from_millis(250);
//! cfg.add_blocks_when_buffer_full = true;
//!
//! assert!(cfg.validate().is_ok());
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::BackoffPolicy;
use crate::stats::StatReceiver;

/// Hard upper bound on records per sink call.
pub const MAX_BATCH_SIZE: usize = 500;

/// Smallest usable nonzero flush cadence.
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(50);

/// Collection of config values for a [`Producer`](crate::Producer).
#[derive(Clone)]
pub struct Config {
    /// Controls the behavior of `submit` when the buffer is full. If true,
    /// `submit` waits for space; if false it returns
    /// [`BufferFull`](crate::ProducerError::BufferFull), letting the
    /// embedding application decide what to do with the record.
    pub add_blocks_when_buffer_full: bool,

    /// Maximum size of the batches sent to the sink. Once the buffer holds
    /// this many records a batch is dispatched immediately, regardless of
    /// `flush_interval`.
    pub batch_size: usize,

    /// Capacity of the buffer that stages records before dispatch. When the
    /// buffer is (nearly) full, `submit` blocks or errors depending on
    /// `add_blocks_when_buffer_full`.
    pub buffer_size: usize,

    /// How often buffered records are flushed downstream even when fewer
    /// than `batch_size` are waiting. Zero disables the periodic flush; the
    /// dispatched batch may then be as small as one record but never larger
    /// than `batch_size`.
    pub flush_interval: Duration,

    /// How many delivery attempts each record gets before it is dropped.
    /// Zero means a record is dropped on its first per-record failure.
    pub max_attempts_per_record: u32,

    /// Best-effort cadence of stats emission. The worker task delivers the
    /// snapshots, so some skew is expected. Zero disables the periodic tick;
    /// final snapshots on stop are still emitted.
    pub stat_interval: Duration,

    /// Receiver called with a snapshot approximately every `stat_interval`.
    pub stat_receiver: Option<Arc<dyn StatReceiver>>,

    /// Delay schedule applied after consecutive whole-batch failures.
    pub backoff: BackoffPolicy,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `add_blocks_when_buffer_full = false`
    /// - `batch_size = 10`
    /// - `buffer_size = 10_000`
    /// - `flush_interval = 1s`
    /// - `max_attempts_per_record = 10`
    /// - `stat_interval = 1s` (no receiver)
    /// - `backoff = BackoffPolicy::default()`
    fn default() -> Self {
        Self {
            add_blocks_when_buffer_full: false,
            batch_size: 10,
            buffer_size: 10_000,
            flush_interval: Duration::from_secs(1),
            max_attempts_per_record: 10,
            stat_interval: Duration::from_secs(1),
            stat_receiver: None,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl Config {
    /// Checks the constraint table and returns the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size < 1 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::BatchSizeOutOfRange {
                got: self.batch_size,
            });
        }

        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }

        if self.buffer_size < self.batch_size && self.flush_interval.is_zero() {
            return Err(ConfigError::BufferSmallerThanBatch {
                buffer_size: self.buffer_size,
                batch_size: self.batch_size,
            });
        }

        if !self.flush_interval.is_zero() && self.flush_interval < MIN_FLUSH_INTERVAL {
            return Err(ConfigError::FlushIntervalTooShort {
                got: self.flush_interval,
            });
        }

        Ok(())
    }
}
