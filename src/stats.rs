//! # Periodic statistics snapshots.
//!
//! The worker accumulates counters while it runs and hands a
//! [`StatsSnapshot`] to the configured [`StatReceiver`] on every stats tick,
//! on stop, and optionally at the end of a flush. Counters are cumulative
//! since the previous snapshot and reset to zero immediately after emission;
//! `buffer_size` is a moment-in-time reading.

/// Receiver of periodic [`StatsSnapshot`]s.
pub trait StatReceiver: Send + Sync + 'static {
    /// Called synchronously on the worker task, so it blocks batches from
    /// being sent. Implementations must be very fast or never block at all.
    fn receive(&self, stats: StatsSnapshot);
}

/// Activity snapshot delivered to a [`StatReceiver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Number of buffered records at the moment the snapshot was taken.
    pub buffer_size: usize,
    /// Whole-batch failures since the last snapshot.
    pub downstream_errors: u64,
    /// Records the sink accepted since the last snapshot.
    pub records_sent_ok: u64,
    /// Records removed without delivery since the last snapshot.
    pub records_dropped: u64,
}

/// Mutable counters owned by the worker between emissions.
#[derive(Debug, Default)]
pub(crate) struct StatsAccumulator {
    pub(crate) downstream_errors: u64,
    pub(crate) records_sent_ok: u64,
    pub(crate) records_dropped: u64,
}

impl StatsAccumulator {
    /// Snapshots the counters together with `buffer_size` and resets them.
    pub(crate) fn drain(&mut self, buffer_size: usize) -> StatsSnapshot {
        let snapshot = StatsSnapshot {
            buffer_size,
            downstream_errors: self.downstream_errors,
            records_sent_ok: self.records_sent_ok,
            records_dropped: self.records_dropped,
        };
        *self = Self::default();
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_resets_counters() {
        let mut acc = StatsAccumulator {
            downstream_errors: 2,
            records_sent_ok: 40,
            records_dropped: 1,
        };

        let snapshot = acc.drain(7);
        assert_eq!(snapshot.buffer_size, 7);
        assert_eq!(snapshot.downstream_errors, 2);
        assert_eq!(snapshot.records_sent_ok, 40);
        assert_eq!(snapshot.records_dropped, 1);

        let empty = acc.drain(0);
        assert_eq!(empty, StatsSnapshot::default());
    }
}
