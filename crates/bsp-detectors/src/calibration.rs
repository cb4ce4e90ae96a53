//! Adaptive threshold calibration

use crate::config::CalibrationConfig;
use bsp_core::{BspResult, MonotonicClock, Sample, SampleSource};
use tracing::info;

/// Samples a channel as fast as it can for a fixed epoch and scales the peak
#[derive(Debug, Clone, Default)]
pub struct ThresholdCalibrator {
    config: CalibrationConfig,
}

impl ThresholdCalibrator {
    pub fn new(config: CalibrationConfig) -> BspResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Run the configured epoch and return `percent` of the peak value
    pub fn calibrate<S, C>(&self, source: &mut S, clock: &C) -> f32
    where
        S: SampleSource,
        C: MonotonicClock,
    {
        self.calibrate_for(source, clock, self.config.duration_ms, self.config.percent)
    }

    /// Run a `duration_ms` epoch and return `percent` of the peak value.
    ///
    /// A zero duration takes no samples and yields 0.
    pub fn calibrate_for<S, C>(&self, source: &mut S, clock: &C, duration_ms: u64, percent: u32) -> f32
    where
        S: SampleSource,
        C: MonotonicClock,
    {
        let start = clock.now_millis();
        let mut peak: Sample = 0;
        let mut samples = 0u64;

        while clock.now_millis().saturating_sub(start) < duration_ms {
            peak = peak.max(source.read(self.config.channel));
            samples += 1;
        }

        let threshold = peak as f32 * percent as f32 / 100.0;
        info!(channel = %self.config.channel, peak, samples, threshold, "calibration complete");
        threshold
    }
}
