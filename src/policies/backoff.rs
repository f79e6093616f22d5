//! # Backoff policy for dispatch after downstream failures.
//!
//! [`BackoffPolicy`] controls how the delay before the next batch grows while
//! the sink keeps failing. It is parameterized by:
//! - [`BackoffPolicy::first`] the delay after the first failure;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::max`] the delay ceiling.
//!
//! A successful batch resets the schedule; the dispatch core then calls
//! [`next`](BackoffPolicy::next) with `None` again on the next failure streak.

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Delay schedule for consecutive whole-batch failures.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay after the first failure.
    pub first: Duration,
    /// Delay ceiling.
    pub max: Duration,
    /// Multiplicative growth per additional failure (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied to the computed delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a schedule with:
    /// - `first = 50ms`;
    /// - `factor = 2.0`;
    /// - `max = 30s`;
    /// - no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(50),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay that follows `prev`.
    ///
    /// - `None` means the streak just started: returns `first` clamped to `max`.
    /// - Otherwise the previous delay grows by [`factor`](Self::factor),
    ///   clamped to [`max`](Self::max).
    ///
    /// Jitter, if configured, is applied to the clamped result.
    pub fn next(&self, prev: Option<Duration>) -> Duration {
        let base = match prev {
            None => self.first.min(self.max),
            Some(d) => {
                let grown = d.as_secs_f64() * self.factor;
                if grown.is_finite() && grown < self.max.as_secs_f64() {
                    Duration::from_secs_f64(grown)
                } else {
                    self.max
                }
            }
        };

        self.jitter.apply(base)
    }
}
