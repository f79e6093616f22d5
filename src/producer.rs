//! # Producer facade: lifecycle, submission, draining flush.
//!
//! [`Producer`] owns the buffer, the event bus, and the parked dispatch core,
//! and synchronizes callers with the background worker:
//!
//! - **start/stop** are serialized by a lifecycle mutex and rendezvous with
//!   the worker, so `start` returns only once the scheduling loop is live and
//!   `stop` only once it has exited (after final stats).
//! - **submit** reads the running flag under a readers–writer lock and
//!   enqueues; when configured to block on a full buffer it also watches the
//!   per-run cancellation token, so a concurrent stop wakes it up instead of
//!   leaving it stranded.
//! - **flush** stops the producer, then keeps draining the parked dispatch
//!   core with maximum-size batches until the buffer is empty or the deadline
//!   passes.

use std::time::Duration;

use tokio::sync::{Mutex, RwLock, broadcast, mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::buffer::{Buffer, BufferHandle};
use crate::config::{Config, MAX_BATCH_SIZE};
use crate::core::{Dispatcher, worker};
use crate::error::{ConfigError, ProducerError};
use crate::events::{Bus, Event};
use crate::record::Record;
use crate::sink::SinkRef;

/// Outcome of a draining flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    /// Records the sink accepted during this flush call.
    pub sent: usize,
    /// Records still buffered when the flush returned.
    pub remaining: usize,
}

/// Collects records individually and sends them to a downstream ingestion
/// service in bounded batches from a background worker, with retries.
///
/// A `Producer` does nothing until [`start`](Producer::start) is called.
/// Share it across submitters behind an `Arc`; every method takes `&self`.
pub struct Producer {
    config: Config,
    buffer: BufferHandle,
    bus: Bus,
    lifecycle: Mutex<Lifecycle>,
    state: RwLock<RunState>,
}

/// Worker-side possessions, guarded by the lifecycle mutex.
struct Lifecycle {
    /// Dispatch core, parked here whenever no worker is running.
    parked: Option<Dispatcher>,
    /// Channels of the currently running worker, if any.
    worker: Option<WorkerHandle>,
}

struct WorkerHandle {
    stop: mpsc::Sender<()>,
    done: oneshot::Receiver<Dispatcher>,
}

/// Submission fast-path state.
struct RunState {
    running: bool,
    /// Cancelled on stop so blocked submitters wake up.
    cancel: CancellationToken,
}

impl Producer {
    /// Validates `config` and builds a stopped producer around `sink`.
    ///
    /// Performs no I/O; the worker is launched by [`start`](Producer::start).
    pub fn new(sink: SinkRef, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let bus = Bus::new(config.buffer_size);
        let buffer = Buffer::new(config.buffer_size);
        let handle = buffer.handle();
        let dispatcher = Dispatcher::new(sink, config.clone(), buffer, bus.clone());

        Ok(Self {
            config,
            buffer: handle,
            bus,
            lifecycle: Mutex::new(Lifecycle {
                parked: Some(dispatcher),
                worker: None,
            }),
            state: RwLock::new(RunState {
                running: false,
                cancel: CancellationToken::new(),
            }),
        })
    }

    /// Launches the background worker.
    ///
    /// Returns only after the worker has entered its scheduling loop, so a
    /// subsequent [`submit`](Producer::submit) cannot race ahead of worker
    /// initialization.
    pub async fn start(&self) -> Result<(), ProducerError> {
        let mut lifecycle = self.lifecycle.lock().await;

        let Some(dispatcher) = lifecycle.parked.take() else {
            return Err(ProducerError::AlreadyStarted);
        };

        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let (done_tx, done_rx) = oneshot::channel();

        tokio::spawn(worker::run(dispatcher, stop_rx, ready_tx, done_tx));
        let _ = ready_rx.await;

        lifecycle.worker = Some(WorkerHandle {
            stop: stop_tx,
            done: done_rx,
        });

        let mut state = self.state.write().await;
        state.running = true;
        state.cancel = CancellationToken::new();

        Ok(())
    }

    /// Stops the background worker.
    ///
    /// Blocks until the worker has emitted final stats and exited its loop.
    /// Once this returns, [`submit`](Producer::submit) fails with
    /// [`NotRunning`](ProducerError::NotRunning) until the next start.
    pub async fn stop(&self) -> Result<(), ProducerError> {
        let mut lifecycle = self.lifecycle.lock().await;
        self.stop_locked(&mut lifecycle).await
    }

    async fn stop_locked(&self, lifecycle: &mut Lifecycle) -> Result<(), ProducerError> {
        let Some(handle) = lifecycle.worker.take() else {
            return Err(ProducerError::AlreadyStopped);
        };

        let _ = handle.stop.send(()).await;
        if let Ok(dispatcher) = handle.done.await {
            lifecycle.parked = Some(dispatcher);
        }

        let mut state = self.state.write().await;
        state.running = false;
        state.cancel.cancel();

        Ok(())
    }

    /// Stages one record for batched delivery.
    ///
    /// Fails with [`NotRunning`](ProducerError::NotRunning) when no worker is
    /// draining the buffer, and with [`BufferFull`](ProducerError::BufferFull)
    /// when the buffer is at capacity and the producer is configured not to
    /// block. A blocking submit observes a concurrent stop and returns
    /// `NotRunning` instead of waiting forever.
    pub async fn submit(
        &self,
        payload: Vec<u8>,
        partition_key: impl Into<String>,
    ) -> Result<(), ProducerError> {
        let cancel = {
            let state = self.state.read().await;
            if !state.running {
                return Err(ProducerError::NotRunning);
            }
            state.cancel.clone()
        };

        if self.buffer.is_full() && !self.config.add_blocks_when_buffer_full {
            return Err(ProducerError::BufferFull);
        }

        let record = Record::new(payload, partition_key.into());
        tokio::select! {
            result = self.buffer.push(record) => result.map_err(|_| ProducerError::NotRunning),
            _ = cancel.cancelled() => Err(ProducerError::NotRunning),
        }
    }

    /// New receiver on the producer's event stream.
    ///
    /// The stream capacity equals `buffer_size`; a consumer that stops
    /// draining loses the oldest events rather than blocking the worker.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Stops the producer and drains the buffer as fast as possible with
    /// batches of up to [`MAX_BATCH_SIZE`] records.
    ///
    /// An [`AlreadyStopped`](ProducerError::AlreadyStopped) error from the
    /// implicit stop is swallowed. A `timeout` of zero means no deadline. The
    /// deadline is checked between batches only: an in-flight sink call is
    /// never interrupted, so a slow sink can overrun the deadline by at most
    /// one request. When the drain finishes in time and `send_stats` is set,
    /// one final stats snapshot is emitted.
    pub async fn flush(
        &self,
        timeout: Duration,
        send_stats: bool,
    ) -> Result<FlushReport, ProducerError> {
        let mut lifecycle = self.lifecycle.lock().await;
        let _ = self.stop_locked(&mut lifecycle).await;

        let Some(mut dispatcher) = lifecycle.parked.take() else {
            return Ok(FlushReport {
                sent: 0,
                remaining: 0,
            });
        };

        let deadline = (!timeout.is_zero()).then(|| Instant::now() + timeout);
        let mut sent = 0;
        let mut timed_out = false;

        while !dispatcher.buffer_is_empty() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                timed_out = true;
                break;
            }
            sent += dispatcher.dispatch(MAX_BATCH_SIZE).await;
        }

        if !timed_out && send_stats {
            dispatcher.emit_stats();
        }

        let remaining = dispatcher.buffer_len();
        lifecycle.parked = Some(dispatcher);

        Ok(FlushReport { sent, remaining })
    }
}
