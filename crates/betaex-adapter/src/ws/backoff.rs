/*
[INPUT]:  Consecutive reconnect attempts
[OUTPUT]: Delay before the next attempt (zero first, then exponential with cap and jitter)
[POS]:    WebSocket layer - reconnect pacing
[UPDATE]: When changing reconnection pacing
*/

use std::time::Duration;

use rand::Rng;

/// Spaces out consecutive reconnects.
///
/// The first attempt after a reset is immediate. Each further attempt waits
/// `initial * factor^(n-1)`, capped at `max`, plus up to `jitter_ms` of
/// random jitter. Reconnection never gives up; only the spacing grows.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    delay_initial: Duration,
    delay_max: Duration,
    factor: f64,
    jitter_ms: u64,
    attempts: u32,
}

impl ReconnectBackoff {
    pub const fn new(delay_initial: Duration, delay_max: Duration, factor: f64, jitter_ms: u64) -> Self {
        Self {
            delay_initial,
            delay_max,
            factor,
            jitter_ms,
            attempts: 0,
        }
    }

    /// Delay for the next attempt; advances the attempt counter
    pub fn next_delay(&mut self) -> Duration {
        let attempt = self.attempts;
        self.attempts = self.attempts.saturating_add(1);

        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = (attempt - 1).min(32) as i32;
        let max_nanos = self.delay_max.as_nanos() as u64;
        let next_nanos = self.delay_initial.as_nanos() as f64 * self.factor.max(1.0).powi(exponent);
        let capped = Duration::from_nanos((next_nanos as u64).min(max_nanos));

        let jitter = if self.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        } else {
            0
        };

        capped + Duration::from_millis(jitter)
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30), 2.0, 250)
    }
}
