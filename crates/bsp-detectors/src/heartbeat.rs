//! Heart rate from peak-to-peak excursions on the cardiac channel
//!
//! Intervals are read the way a paper ECG strip is: in 200 ms large boxes
//! and 40 ms small boxes, with `300 / large boxes` giving beats per minute.

use crate::config::HeartbeatConfig;
use bsp_core::{BspResult, MonotonicClock, SampleClock, SampleSource, SlidingWindow};
use tracing::{debug, info};

/// Strip-chart length of an interval in large-box units
pub fn box_units(interval_ms: u64, large_box_ms: u64, small_box_ms: u64) -> f32 {
    let large = interval_ms / large_box_ms;
    let small = (interval_ms - large * large_box_ms) / small_box_ms;
    large as f32 + 0.2 * small as f32
}

/// Estimates heart rate over an epoch
#[derive(Debug, Clone)]
pub struct HeartbeatDetector {
    config: HeartbeatConfig,
    sample_clock: SampleClock,
}

impl HeartbeatDetector {
    pub fn new(config: HeartbeatConfig) -> BspResult<Self> {
        config.validate()?;
        let sample_clock = SampleClock::from_rate_hz(config.rate_hz)?;
        Ok(Self { config, sample_clock })
    }

    pub fn config(&self) -> &HeartbeatConfig {
        &self.config
    }

    /// Sample for `duration_ms` and return beats per minute.
    ///
    /// Intervals are measured from the previous beat, or from the start of
    /// the epoch for the first one. `None` means no beat was seen.
    pub fn heart_rate<S, C>(&self, source: &mut S, clock: &C, duration_ms: u64) -> Option<f32>
    where
        S: SampleSource,
        C: MonotonicClock,
    {
        let mut window = SlidingWindow::with_capacity(self.config.window_size);
        let mut sample_clock = self.sample_clock.clone();
        let mut wait = 0usize;
        let mut beats = 0u32;
        let mut units = 0.0f32;

        let start = clock.now_millis();
        let mut last_beat = start;
        sample_clock.start(clock);

        while clock.now_millis().saturating_sub(start) < duration_ms {
            sample_clock.wait(clock);
            window.push(source.read(self.config.channel));

            if wait > 0 {
                wait -= 1;
                continue;
            }
            if !window.is_full() {
                continue;
            }

            let range = window.range().unwrap_or_default();
            if range <= self.config.range_threshold {
                continue;
            }

            let now = clock.now_millis();
            let interval = now.saturating_sub(last_beat);
            let unit = box_units(interval, self.config.large_box_ms, self.config.small_box_ms);
            units += unit;
            beats += 1;
            debug!(interval_ms = interval, unit, range, beats, "beat registered");
            last_beat = now;
            wait = self.config.refractory_samples();
        }

        if beats == 0 || units <= 0.0 {
            info!(duration_ms, "heart rate undetermined");
            return None;
        }

        let bpm = 300.0 / (units / beats as f32);
        info!(bpm, beats, "heart rate epoch complete");
        Some(bpm)
    }
}

impl Default for HeartbeatDetector {
    fn default() -> Self {
        Self::new(HeartbeatConfig::default()).expect("default heartbeat configuration is valid")
    }
}
