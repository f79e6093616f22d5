//! # Jitter policy for retry delays.
//!
//! A fleet of producers backing off in lockstep hits the downstream service
//! in synchronized waves; [`JitterPolicy`] spreads those retries out by
//! randomizing each computed delay.
//!
//! - [`JitterPolicy::None`] exact delays, predictable schedule
//! - [`JitterPolicy::Full`] random delay in `[0, delay]`
//! - [`JitterPolicy::Equal`] half the delay kept, the other half randomized

use std::time::Duration;

use rand::Rng;

/// Randomization applied to backoff delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Use the exact computed delay.
    #[default]
    None,

    /// Random delay in `[0, delay]`. Maximum spread, can shrink the delay to
    /// nearly nothing.
    Full,

    /// `delay / 2` plus a random share of the other half. Preserves most of
    /// the backoff while still de-correlating retries.
    Equal,
}

impl JitterPolicy {
    /// Applies this policy to `delay`.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => {
                if ms == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rand::rng().random_range(0..=ms))
            }
            JitterPolicy::Equal => {
                let half = ms / 2;
                if half == 0 {
                    return delay;
                }
                Duration::from_millis(half + rand::rng().random_range(0..=half))
            }
        }
    }
}
