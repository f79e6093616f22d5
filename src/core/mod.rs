//! Dispatch core: the batching worker and its scheduling loop.
//!
//! This module contains the embedded implementation of the producer engine.
//! Nothing here is public API; the facade in [`crate::producer`] wires it
//! together.
//!
//! ## Files & responsibilities
//! - **dispatcher.rs**: single-flight batch dispatch; takes records from the
//!   buffer head, calls the sink, applies backoff, charges per-record
//!   attempts, re-enqueues or drops failures, publishes events, accumulates
//!   and emits stats.
//! - **worker.rs**: the background scheduling loop; selects over the stop
//!   rendezvous, the flush and stats tickers, and the eager-dispatch idle
//!   poll.
//!
//! ## Ownership (module-level flow)
//! ```text
//! Producer::new()   ──► Dispatcher parked on the facade
//! Producer::start() ──► Dispatcher moves into the worker task
//!                        └─ ready rendezvous resolves, submits may proceed
//! Producer::stop()  ──► stop signal ──► final stats ──► Dispatcher handed
//!                        back through the done channel
//! Producer::flush() ──► keeps draining the parked Dispatcher after stop
//! ```
//!
//! Every `Dispatcher` field is mutated from exactly one task at a time, so
//! the retry and stats state needs no locking.

pub(crate) mod dispatcher;
pub(crate) mod worker;

pub(crate) use dispatcher::Dispatcher;
