//! # Single-flight batch dispatch.
//!
//! [`Dispatcher`] owns the buffer, the sink handle, the retry/backoff state,
//! and the stats accumulator. At most one `put_batch` call is in flight at
//! any time.
//!
//! ## Failure handling
//! ```text
//! put_batch(batch)
//!   ├─ Err(whole batch)
//!   │    ├─ consecutive_errors ≥ 5 AND buffer ≥ 95% full → drop batch (loud)
//!   │    └─ otherwise → re-enqueue batch at the tail (attempts unchanged)
//!   └─ Ok(per-record results)
//!        ├─ failed record, attempts < cap → charge attempt, re-enqueue
//!        ├─ failed record, attempts = cap → drop (counted, loud)
//!        └─ rest → counted as sent
//! ```
//!
//! Re-enqueues run from a spawned task so a full buffer cannot stall the
//! dispatch loop while ingest is saturated.

use std::time::Duration;

use tokio::time;
use tracing::{debug, error};

use crate::buffer::Buffer;
use crate::config::Config;
use crate::events::{Bus, Event, EventKind};
use crate::record::Record;
use crate::sink::{BatchOutput, RecordResult, SinkError, SinkRef};
use crate::stats::StatsAccumulator;

/// Consecutive whole-batch failures after which a batch may be shed.
pub(crate) const DROP_ERROR_THRESHOLD: u32 = 5;

/// Dispatch core shared between the worker loop and the draining flush.
///
/// Owned by the facade between runs and by the worker task while running, so
/// every field is mutated from exactly one task at a time.
pub(crate) struct Dispatcher {
    sink: SinkRef,
    config: Config,
    buffer: Buffer,
    bus: Bus,
    stats: StatsAccumulator,
    consecutive_errors: u32,
    current_delay: Duration,
}

impl Dispatcher {
    pub(crate) fn new(sink: SinkRef, config: Config, buffer: Buffer, bus: Bus) -> Self {
        Self {
            sink,
            config,
            buffer,
            bus,
            stats: StatsAccumulator::default(),
            consecutive_errors: 0,
            current_delay: Duration::ZERO,
        }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub(crate) fn buffer_is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Dispatches one batch of up to `target` records.
    ///
    /// Returns the number of records the sink accepted during this call.
    pub(crate) async fn dispatch(&mut self, target: usize) -> usize {
        if self.buffer.is_empty() {
            return 0;
        }

        self.apply_backoff().await;

        let records = self.buffer.take(target);
        if records.is_empty() {
            return 0;
        }

        match self.sink.put_batch(&records).await {
            Ok(output) => self.on_batch_success(records, output),
            Err(err) => {
                self.on_batch_failure(records, &err);
                0
            }
        }
    }

    /// Snapshots and resets the accumulator, handing the snapshot to the
    /// configured receiver. No-op without a receiver.
    pub(crate) fn emit_stats(&mut self) {
        let Some(receiver) = self.config.stat_receiver.as_ref() else {
            return;
        };

        let snapshot = self.stats.drain(self.buffer.len());
        receiver.receive(snapshot);
    }

    async fn apply_backoff(&mut self) {
        if self.consecutive_errors == 1 {
            self.current_delay = self.config.backoff.next(None);
        } else if self.consecutive_errors > 1 {
            self.current_delay = self.config.backoff.next(Some(self.current_delay));
        }

        if !self.current_delay.is_zero() {
            debug!(
                delay_ms = self.current_delay.as_millis() as u64,
                consecutive_errors = self.consecutive_errors,
                "delaying batch after consecutive downstream failures"
            );
            time::sleep(self.current_delay).await;
        }
    }

    fn on_batch_failure(&mut self, records: Vec<Record>, err: &SinkError) {
        self.consecutive_errors += 1;
        self.stats.downstream_errors += 1;

        let message = err.to_string();
        self.bus
            .publish(Event::now(EventKind::BatchFailed).with_error(message.clone()));

        if self.consecutive_errors >= DROP_ERROR_THRESHOLD && self.buffer.is_nearly_full() {
            // Saturated buffer plus persistently failing downstream: shed the
            // batch instead of re-enqueueing, so blocked submitters can make
            // progress again.
            self.stats.records_dropped += records.len() as u64;
            error!(
                dropped = records.len(),
                consecutive_errors = self.consecutive_errors,
                "dropping records because the buffer is nearly full and the sink keeps failing"
            );
            self.bus.publish(
                Event::now(EventKind::RecordsDropped)
                    .with_count(records.len())
                    .with_error(message),
            );
        } else {
            debug!(
                returned = records.len(),
                consecutive_errors = self.consecutive_errors,
                "returning failed batch to the buffer"
            );
            self.requeue(records);
        }
    }

    fn on_batch_success(&mut self, records: Vec<Record>, output: BatchOutput) -> usize {
        self.consecutive_errors = 0;
        self.current_delay = Duration::ZERO;

        let succeeded = match output.failed_count {
            None => {
                debug!(sent = records.len(), "batch delivered");
                records.len()
            }
            Some(failed) => {
                let succeeded = records.len().saturating_sub(failed);
                debug!(
                    succeeded,
                    failed, "partial delivery, re-enqueueing failed records"
                );
                self.handle_record_failures(records, output.records);
                succeeded
            }
        };

        self.stats.records_sent_ok += succeeded as u64;
        succeeded
    }

    /// Walks the per-record result vector (positionally aligned with the
    /// batch), charging an attempt to each failed record.
    fn handle_record_failures(&mut self, records: Vec<Record>, results: Vec<RecordResult>) {
        let mut retries = Vec::new();

        for (mut record, result) in records.into_iter().zip(results) {
            if !result.is_failed() {
                continue;
            }

            record.attempts += 1;

            let mut ev = Event::now(EventKind::RecordFailed)
                .with_error(result.error_message.clone().unwrap_or_default())
                .with_attempt(record.attempts);
            if let Some(code) = &result.error_code {
                ev = ev.with_code(code.clone());
            }
            self.bus.publish(ev);

            if record.attempts < self.config.max_attempts_per_record {
                retries.push(record);
            } else {
                self.stats.records_dropped += 1;
                error!(
                    attempts = record.attempts,
                    code = result.error_code.as_deref().unwrap_or("unknown"),
                    message = result.error_message.as_deref().unwrap_or(""),
                    "dropping record that exhausted its attempt budget"
                );
            }
        }

        if !retries.is_empty() {
            self.requeue(retries);
        }
    }

    /// Appends records back at the buffer tail from a spawned task, so a full
    /// buffer cannot stall the dispatch loop. Attempt counters ride along
    /// unchanged.
    fn requeue(&self, records: Vec<Record>) {
        let tx = self.buffer.returner();
        tokio::spawn(async move {
            for record in records {
                if tx.send(record).await.is_err() {
                    break;
                }
            }
        });
    }
}
