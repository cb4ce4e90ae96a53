//! Muscle spike counting with sustained-grip rejection
//!
//! The EMG channel is smoothed by a moving average over the whole window.
//! A spike is an excursion of that average above the threshold which
//! returns below it within `grip_ms`. While an excursion is in progress the
//! loop samples at the finer `rising_period_us`; the deadline is checked on
//! every sample in every state.

use crate::config::SpikeConfig;
use bsp_core::{BspResult, MonotonicClock, SampleClock, SampleSource, SlidingWindow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

/// Result of a spike counting epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpikeOutcome {
    /// Number of short excursions seen
    Spikes(u32),
    /// An excursion lasted at least `grip_ms`; any count is void
    Grip,
}

impl SpikeOutcome {
    /// Count, or `None` after a grip
    pub fn count(&self) -> Option<u32> {
        match self {
            SpikeOutcome::Spikes(n) => Some(*n),
            SpikeOutcome::Grip => None,
        }
    }

    /// Integer form used by the board firmware: the count, or -1 for a grip
    pub fn legacy_code(&self) -> i32 {
        match self {
            SpikeOutcome::Spikes(n) => *n as i32,
            SpikeOutcome::Grip => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpikeState {
    /// Window not yet full
    Filling,
    /// Smoothed level at or below threshold
    Normal,
    /// Smoothed level above threshold since `since_ms`
    Rising { since_ms: u64 },
}

/// Counts EMG spikes over an epoch
#[derive(Debug, Clone)]
pub struct SpikeCounter {
    config: SpikeConfig,
    sample_clock: SampleClock,
}

impl SpikeCounter {
    pub fn new(config: SpikeConfig) -> BspResult<Self> {
        config.validate()?;
        let sample_clock = SampleClock::from_rate_hz(config.rate_hz)?;
        Ok(Self { config, sample_clock })
    }

    pub fn config(&self) -> &SpikeConfig {
        &self.config
    }

    /// Sample for `duration_ms` and count spikes.
    ///
    /// Returns [`SpikeOutcome::Grip`] as soon as an excursion reaches
    /// `grip_ms`, regardless of spikes counted before it.
    pub fn count_spikes<S, C>(&self, source: &mut S, clock: &C, duration_ms: u64) -> SpikeOutcome
    where
        S: SampleSource,
        C: MonotonicClock,
    {
        let mut window = SlidingWindow::with_capacity(self.config.window_size);
        let mut sample_clock = self.sample_clock.clone();
        let mut state = SpikeState::Filling;
        let mut count = 0u32;

        let start = clock.now_millis();
        sample_clock.start(clock);

        while clock.now_millis().saturating_sub(start) < duration_ms {
            let period = match state {
                SpikeState::Rising { .. } => self.config.rising_period_us,
                _ => self.sample_clock.period_us(),
            };
            sample_clock.wait_period(clock, period);

            let value = source.read(self.config.channel);
            window.push(value);
            if !window.is_full() {
                continue;
            }

            let mean = window.mean().unwrap_or_default();
            let now = clock.now_millis();
            trace!(value, mean, "emg sample");

            state = match state {
                SpikeState::Filling | SpikeState::Normal => {
                    if mean > self.config.threshold {
                        debug!(mean, at_ms = now - start, "excursion started");
                        SpikeState::Rising { since_ms: now }
                    } else {
                        SpikeState::Normal
                    }
                }
                SpikeState::Rising { since_ms } => {
                    let lasted = now.saturating_sub(since_ms);
                    if lasted >= self.config.grip_ms {
                        warn!(lasted_ms = lasted, spikes = count, "sustained grip, discarding count");
                        return SpikeOutcome::Grip;
                    }
                    if mean <= self.config.threshold {
                        count += 1;
                        debug!(lasted_ms = lasted, count, "spike counted");
                        SpikeState::Normal
                    } else {
                        state
                    }
                }
            };
        }

        if let SpikeState::Rising { since_ms } = state {
            debug!(lasted_ms = clock.now_millis().saturating_sub(since_ms), "excursion cut off by deadline");
        }
        info!(spikes = count, duration_ms, "spike epoch complete");
        SpikeOutcome::Spikes(count)
    }
}

impl Default for SpikeCounter {
    fn default() -> Self {
        Self::new(SpikeConfig::default()).expect("default spike configuration is valid")
    }
}
