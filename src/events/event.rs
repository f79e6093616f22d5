//! # Events emitted by the dispatch core.
//!
//! The [`EventKind`] enum classifies what happened downstream:
//! - **Batch-level**: a whole `put_batch` call failed.
//! - **Record-level**: a single record failed inside a delivered batch.
//! - **Terminal**: records were dropped without delivery.
//!
//! The [`Event`] struct carries metadata such as the sink's error message and
//! code, the record's attempt count, and the number of records concerned.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically, so events can be ordered correctly even when read from
//! multiple subscribers.
//!
//! ## String form
//! [`Event`] implements [`Display`](std::fmt::Display), yielding the error
//! message when one is present. Consumers that only read the string form keep
//! working when new kinds or fields are introduced.
//!
//! ## Example
//! ```rust
//! use batchflow::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::RecordFailed)
//!     .with_error("throughput exceeded")
//!     .with_code("ThroughputExceeded")
//!     .with_attempt(3);
//!
//! assert_eq!(ev.kind, EventKind::RecordFailed);
//! assert_eq!(ev.to_string(), "throughput exceeded");
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of producer events.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A whole `put_batch` call failed; the batch was re-enqueued or, under
    /// the saturated-error rule, dropped.
    BatchFailed,
    /// A single record failed inside an otherwise delivered batch.
    RecordFailed,
    /// Records were removed without delivery.
    RecordsDropped,
}

/// Producer event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp (may go backwards, use for logging only).
    pub at: SystemTime,
    /// The kind of event.
    pub kind: EventKind,
    /// Error message reported by the sink, if any.
    pub error: Option<String>,
    /// Sink-provided error code for per-record failures.
    pub code: Option<String>,
    /// Attempts consumed by the record this event concerns.
    pub attempt: Option<u32>,
    /// Number of records this event concerns.
    pub count: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            error: None,
            code: None,
            attempt: None,
            count: None,
        }
    }

    /// Attaches an error message.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }

    /// Attaches a sink error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attaches an attempt count.
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a record count.
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n);
        self
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(msg) => f.write_str(msg),
            None => f.write_str(match self.kind {
                EventKind::BatchFailed => "batch failed",
                EventKind::RecordFailed => "record failed",
                EventKind::RecordsDropped => "records dropped",
            }),
        }
    }
}
