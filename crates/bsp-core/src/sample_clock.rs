//! Fixed-period sample pacing
//!
//! Each wait sleeps whatever is left of the period since the previous
//! sample. Overruns are counted but never paid back on later periods.

use crate::error::{BspError, BspResult};
use crate::hal::MonotonicClock;
use tracing::trace;

/// Highest loop rate a detector may request
pub const MAX_RATE_HZ: f32 = 10_000.0;

/// Paces a sampling loop at a fixed period in microseconds
#[derive(Debug, Clone)]
pub struct SampleClock {
    period_us: u64,
    last_us: u64,
    overruns: u64,
}

impl SampleClock {
    /// Create a clock with an explicit period
    pub fn new(period_us: u64) -> Self {
        Self {
            period_us,
            last_us: 0,
            overruns: 0,
        }
    }

    /// Create a clock for a loop running at `rate_hz`
    pub fn from_rate_hz(rate_hz: f32) -> BspResult<Self> {
        Ok(Self::new(period_for_rate(rate_hz)?))
    }

    /// Period in microseconds
    pub fn period_us(&self) -> u64 {
        self.period_us
    }

    /// Number of waits that found the period already exceeded
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Mark "now" as the time of the previous sample
    pub fn start<C: MonotonicClock>(&mut self, clock: &C) -> u64 {
        self.last_us = clock.now_micros();
        self.overruns = 0;
        self.last_us
    }

    /// Sleep out the remainder of the configured period and return the new now
    pub fn wait<C: MonotonicClock>(&mut self, clock: &C) -> u64 {
        self.wait_period(clock, self.period_us)
    }

    /// Sleep out the remainder of `period_us` and return the new now
    pub fn wait_period<C: MonotonicClock>(&mut self, clock: &C, period_us: u64) -> u64 {
        let elapsed = clock.now_micros().saturating_sub(self.last_us);
        if elapsed < period_us {
            clock.sleep_micros(period_us - elapsed);
        } else if elapsed > period_us {
            self.overruns += 1;
            trace!(elapsed, period_us, "sample period overrun");
        }
        self.last_us = clock.now_micros();
        self.last_us
    }
}

/// Convert a loop rate into a whole-microsecond period
pub fn period_for_rate(rate_hz: f32) -> BspResult<u64> {
    if !(rate_hz > 0.0 && rate_hz <= MAX_RATE_HZ) {
        return Err(BspError::InvalidSamplingRate {
            rate: rate_hz,
            valid_range: format!("0-{}Hz", MAX_RATE_HZ),
        });
    }
    Ok((1_000_000.0 / rate_hz as f64).round() as u64)
}
