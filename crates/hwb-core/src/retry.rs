//! Retry policy: decides how long the poll loop sleeps between cycles.

use std::time::Duration;

/// Sleep schedule for the poll loop.
///
/// With `multiplier == 1.0` every cycle waits `interval`, whatever happened.
/// Larger multipliers back off after consecutive failed cycles:
/// `interval * multiplier^failures`, capped at `max_interval`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub multiplier: f64,
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
            multiplier: 1.0,
            max_interval: Duration::from_secs(3600),
        }
    }
}

impl RetryPolicy {
    /// Constant interval, no backoff.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            multiplier: 1.0,
            max_interval: interval,
        }
    }

    /// Delay before the next cycle given the number of consecutive failed cycles.
    pub fn next_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 || self.multiplier <= 1.0 {
            return self.interval;
        }
        let exp = consecutive_failures.min(i32::MAX as u32) as i32;
        let secs = self.interval.as_secs_f64() * self.multiplier.powi(exp);
        let cap = self.max_interval.max(self.interval);
        if !secs.is_finite() || secs >= cap.as_secs_f64() {
            return cap;
        }
        Duration::from_secs_f64(secs)
    }
}
