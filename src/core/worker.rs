//! # Background scheduling loop.
//!
//! One worker task drives all dispatch. It selects over four signals, stop
//! first:
//!
//! ```text
//! loop {
//!   select! {
//!     stop request → break
//!     flush tick   → dispatch(batch_size)            (flush_interval > 0)
//!     stats tick   → emit snapshot                   (receiver configured, stat_interval > 0)
//!     idle (1ms)   → dispatch(batch_size) if buffer ≥ batch_size
//!   }
//! }
//! final stats → hand the dispatcher back
//! ```
//!
//! The idle arm is the eager path: when the buffer fills faster than the
//! flush cadence, batches go out as soon as a full one is available instead
//! of waiting for the tick. The 1 ms poll yields to the scheduler between
//! checks.

use std::future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::core::dispatcher::Dispatcher;

/// Poll cadence of the eager-dispatch arm.
const IDLE_POLL: Duration = Duration::from_millis(1);

/// Runs the scheduling loop until a stop request arrives.
///
/// `ready` resolves the start rendezvous once the loop is entered, so a
/// submit that follows `start` cannot race ahead of worker initialization.
/// The dispatcher is handed back through `done` as the stop acknowledgement,
/// after final stats have been emitted.
pub(crate) async fn run(
    mut dispatcher: Dispatcher,
    mut stop: mpsc::Receiver<()>,
    ready: oneshot::Sender<()>,
    done: oneshot::Sender<Dispatcher>,
) {
    let batch_size = dispatcher.config().batch_size;

    let mut flush_tick = delayed_interval(dispatcher.config().flush_interval);
    let mut stat_tick = if dispatcher.config().stat_receiver.is_some() {
        delayed_interval(dispatcher.config().stat_interval)
    } else {
        None
    };
    let mut idle = time::interval(IDLE_POLL);

    let _ = ready.send(());

    loop {
        tokio::select! {
            biased;
            _ = stop.recv() => break,
            _ = tick(flush_tick.as_mut()) => {
                dispatcher.dispatch(batch_size).await;
            }
            _ = tick(stat_tick.as_mut()) => {
                dispatcher.emit_stats();
            }
            _ = idle.tick() => {
                if dispatcher.buffer_len() >= batch_size {
                    dispatcher.dispatch(batch_size).await;
                }
            }
        }
    }

    dispatcher.emit_stats();
    let _ = done.send(dispatcher);
}

/// Interval whose first tick lands one full period out, or `None` when the
/// period is zero (signal disabled).
fn delayed_interval(period: Duration) -> Option<Interval> {
    if period.is_zero() {
        return None;
    }
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(interval)
}

/// Resolves on the next tick, or never for a disabled signal.
async fn tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}
