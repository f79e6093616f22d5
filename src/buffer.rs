//! # Capacity-bounded FIFO of pending records.
//!
//! The buffer is a bounded [`tokio::sync::mpsc`] channel: any number of
//! submitters enqueue at the tail, the single worker dequeues from the head.
//! Retried records are appended at the tail as well, so ordering across
//! retries is not preserved.
//!
//! Fill ratios are computed from the sender side and are slightly imprecise
//! under concurrency; the thresholds below account for that by treating the
//! buffer as full a little before it actually is.

use tokio::sync::mpsc;

use crate::record::Record;

/// Fill ratio at which submitters are refused (size estimates carry a small
/// margin of error, so "full" starts at 99%).
pub(crate) const FULL_RATIO: f64 = 0.99;

/// Fill ratio above which a saturated-error batch is dropped instead of
/// re-enqueued.
pub(crate) const NEARLY_FULL_RATIO: f64 = 0.95;

/// Both halves of the buffer; owned by the dispatch core.
///
/// Only the worker dequeues. The sender half is cloned into
/// [`BufferHandle`]s for submitters and into re-enqueue tasks.
pub(crate) struct Buffer {
    tx: mpsc::Sender<Record>,
    rx: mpsc::Receiver<Record>,
}

impl Buffer {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self { tx, rx }
    }

    /// Enqueue-side handle for the submission surface.
    pub(crate) fn handle(&self) -> BufferHandle {
        BufferHandle {
            tx: self.tx.clone(),
        }
    }

    /// Sender used to append retried records at the tail.
    pub(crate) fn returner(&self) -> mpsc::Sender<Record> {
        self.tx.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.rx.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Takes up to `target` records from the head, never blocking.
    pub(crate) fn take(&mut self, target: usize) -> Vec<Record> {
        let take = target.min(self.rx.len());
        let mut records = Vec::with_capacity(take);
        for _ in 0..take {
            match self.rx.try_recv() {
                Ok(record) => records.push(record),
                Err(_) => break,
            }
        }
        records
    }

    pub(crate) fn is_nearly_full(&self) -> bool {
        fill_ratio(&self.tx) >= NEARLY_FULL_RATIO
    }
}

/// Enqueue half of the buffer, shared by all submitters.
#[derive(Clone)]
pub(crate) struct BufferHandle {
    tx: mpsc::Sender<Record>,
}

impl BufferHandle {
    /// Fullness probe for the submit fast path.
    pub(crate) fn is_full(&self) -> bool {
        fill_ratio(&self.tx) >= FULL_RATIO
    }

    /// Appends a record at the tail, waiting for capacity when needed.
    ///
    /// Fails only when the receive half is gone, which does not happen while
    /// the owning producer is alive.
    pub(crate) async fn push(&self, record: Record) -> Result<(), mpsc::error::SendError<Record>> {
        self.tx.send(record).await
    }
}

fn fill_ratio(tx: &mpsc::Sender<Record>) -> f64 {
    let max = tx.max_capacity();
    let used = max - tx.capacity();
    used as f64 / max as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: u8) -> Record {
        Record::new(vec![n], format!("key-{n}"))
    }

    #[tokio::test]
    async fn take_preserves_enqueue_order() {
        let mut buffer = Buffer::new(8);
        let handle = buffer.handle();
        for n in 0..5 {
            handle.push(record(n)).await.expect("push");
        }

        let taken = buffer.take(3);
        let payloads: Vec<u8> = taken.iter().map(|r| r.payload[0]).collect();
        assert_eq!(payloads, vec![0, 1, 2]);
        assert_eq!(buffer.len(), 2);
    }

    #[tokio::test]
    async fn take_is_bounded_by_buffer_size() {
        let mut buffer = Buffer::new(8);
        let handle = buffer.handle();
        handle.push(record(1)).await.expect("push");

        let taken = buffer.take(100);
        assert_eq!(taken.len(), 1);
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn take_from_empty_buffer_yields_nothing() {
        let mut buffer = Buffer::new(4);
        assert!(buffer.take(4).is_empty());
    }

    #[tokio::test]
    async fn fullness_thresholds() {
        let mut buffer = Buffer::new(100);
        let handle = buffer.handle();

        for n in 0..94 {
            handle.push(record(n as u8)).await.expect("push");
        }
        assert!(!buffer.is_nearly_full());
        assert!(!handle.is_full());

        handle.push(record(94)).await.expect("push");
        assert!(buffer.is_nearly_full());
        assert!(!handle.is_full());

        for n in 95..99 {
            handle.push(record(n as u8)).await.expect("push");
        }
        assert!(handle.is_full());

        buffer.take(10);
        assert!(!handle.is_full());
    }

    #[tokio::test]
    async fn single_slot_buffer_is_full_after_one_push() {
        let buffer = Buffer::new(1);
        let handle = buffer.handle();
        assert!(!handle.is_full());
        handle.push(record(0)).await.expect("push");
        assert!(handle.is_full());
    }
}
