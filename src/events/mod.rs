//! Observability events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** the worker
//! publishes through while it dispatches batches.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: the dispatch core (whole-batch failures, per-record
//!   failures, drops).
//! - **Consumers**: any number of receivers obtained from
//!   [`Producer::events`](crate::Producer::events).

mod bus;
mod event;

pub(crate) use bus::Bus;
pub use event::{Event, EventKind};
