//! # Event bus for broadcasting producer events.
//!
//! [`Bus`] is a wrapper around [`tokio::sync::broadcast`] that lets the
//! dispatch core publish [`Event`]s to multiple subscribers simultaneously.
//!
//! ## Key characteristics:
//! - **Broadcast semantics**: all active subscribers receive a clone of each event
//! - **Non-persistent**: events are lost if there are no active subscribers
//! - **Bounded capacity**: the oldest events are dropped when the channel is
//!   full, so publication never blocks the worker behind a slow consumer
//!
//! ## Usage:
//! - [`Bus::publish`] broadcasts an event to all current subscribers (non-blocking)
//! - [`Bus::subscribe`] creates a new receiver that will receive all future events

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for producer events.
///
/// Wrapper over [`tokio::sync::broadcast`] that provides `publish`/`subscribe`
/// methods for working with [`Event`]s.
#[derive(Clone)]
pub(crate) struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// When capacity is exceeded, the oldest unread events are dropped for
    /// lagging subscribers.
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no active subscribers the event is dropped silently; the
    /// producer operates fine without observers.
    pub(crate) fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new subscriber that will receive all future events.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
