//! Retry policies for downstream failures:
//!  - [`BackoffPolicy`] for whole-batch failure delays;
//!  - [`JitterPolicy`] for randomizing those delays.
//!
//! ## Overview
//! - [`backoff`]: compute the next delay after consecutive failures with a
//!   capped multiplicative growth.
//! - [`jitter`]: optionally spread retries out across a producer fleet.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use batchflow::BackoffPolicy;
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(50),
//!     max: Duration::from_millis(150),
//!     factor: 2.0,
//!     ..BackoffPolicy::default()
//! };
//!
//! // First failure: the schedule starts at `first`.
//! assert_eq!(backoff.next(None), Duration::from_millis(50));
//!
//! // Each further failure doubles the delay...
//! assert_eq!(backoff.next(Some(Duration::from_millis(50))), Duration::from_millis(100));
//!
//! // ...until the cap.
//! assert_eq!(backoff.next(Some(Duration::from_millis(100))), Duration::from_millis(150));
//! ```

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
