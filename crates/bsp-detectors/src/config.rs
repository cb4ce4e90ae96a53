//! Configuration management for the detectors
//!
//! Defaults reproduce the tuned constants of the reference board. A
//! configuration file only needs the fields it changes.

use bsp_core::{config_error, period_for_rate, BspError, BspResult, Channel, Sample};
use serde::{Deserialize, Serialize};

/// Threshold calibration epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub channel: Channel,
    /// Acquisition epoch length
    pub duration_ms: u64,
    /// Share of the observed maximum to return
    pub percent: u32,
}

/// Muscle spike counting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeConfig {
    pub channel: Channel,
    pub rate_hz: f32,
    pub window_size: usize,
    /// Moving-average level that starts an excursion
    pub threshold: f32,
    /// Excursions this long are a sustained grip
    pub grip_ms: u64,
    /// Sample period while an excursion is in progress
    pub rising_period_us: u64,
}

/// Heart rate from the cardiac channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    pub channel: Channel,
    pub rate_hz: f32,
    pub window_size: usize,
    /// Peak-to-peak amplitude that registers a beat
    pub range_threshold: Sample,
    /// Refractory period after a beat, in whole windows
    pub refractory_windows: usize,
    pub large_box_ms: u64,
    pub small_box_ms: u64,
}

/// Vertical gaze and blink classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalGazeConfig {
    pub channel: Channel,
    pub rate_hz: f32,
    pub epoch_ms: u64,
    /// Averaging window for up/down, fed from the blink delay line
    pub updown_window: usize,
    pub baseline: f32,
    pub up_ratio: f32,
    pub down_ratio: f32,
    /// Slope over the blink delay line (ADC counts per sample) that means a blink
    pub blink_slope: f32,
}

/// Horizontal gaze classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizontalGazeConfig {
    pub channel: Channel,
    pub rate_hz: f32,
    pub epoch_ms: u64,
    pub window_size: usize,
    pub baseline: f32,
    pub left_ratio: f32,
    pub right_ratio: f32,
}

/// Rise-then-fall blink transient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    pub channel: Channel,
    pub rate_hz: f32,
    /// Minimum jump between consecutive samples (exclusive)
    pub jump_threshold: Sample,
    /// How long the fall-back may take after the rise
    pub check_ms: u64,
}

/// Cued reaction timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    pub channel: Channel,
    /// Level that counts as a response (exclusive)
    pub threshold: Sample,
    pub window_ms: u64,
    pub cue_ms: u64,
}

/// Configuration for every detector on the board
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub calibration: CalibrationConfig,
    pub spikes: SpikeConfig,
    pub heartbeat: HeartbeatConfig,
    pub vertical_gaze: VerticalGazeConfig,
    pub horizontal_gaze: HorizontalGazeConfig,
    pub blink: BlinkConfig,
    pub reaction: ReactionConfig,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Emg,
            duration_ms: 3000,
            percent: 100,
        }
    }
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Emg,
            rate_hz: 200.0,
            window_size: 20,
            threshold: 150.0,
            grip_ms: 500,
            rising_period_us: 1000,
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Ecg,
            rate_hz: 150.0,
            window_size: 6,
            range_threshold: 300,
            refractory_windows: 3,
            large_box_ms: 200,
            small_box_ms: 40,
        }
    }
}

impl Default for VerticalGazeConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Eog,
            rate_hz: 50.0,
            epoch_ms: 500,
            updown_window: 10,
            baseline: 450.0,
            up_ratio: 1.40,
            down_ratio: 0.60,
            blink_slope: -75.0,
        }
    }
}

impl Default for HorizontalGazeConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Eog,
            rate_hz: 50.0,
            epoch_ms: 500,
            window_size: 10,
            baseline: 450.0,
            left_ratio: 1.25,
            right_ratio: 0.75,
        }
    }
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Eog,
            rate_hz: 50.0,
            jump_threshold: 40,
            check_ms: 300,
        }
    }
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Emg,
            threshold: 200,
            window_ms: 1500,
            cue_ms: 100,
        }
    }
}

fn ensure(condition: bool, field: &'static str, reason: &'static str) -> BspResult<()> {
    if condition {
        Ok(())
    } else {
        Err(config_error!(field, reason))
    }
}

/// Checks shared by the two gaze axes
fn validate_band(baseline: f32, positive: f32, negative: f32) -> BspResult<()> {
    ensure(baseline > 0.0, "baseline", "must be positive")?;
    ensure(negative > 0.0, "negative ratio", "must be positive")?;
    ensure(positive > negative, "positive ratio", "must exceed the negative ratio")
}

impl CalibrationConfig {
    pub fn validate(&self) -> BspResult<()> {
        ensure(self.percent <= 1000, "calibration.percent", "must be at most 1000")
    }
}

impl SpikeConfig {
    pub fn validate(&self) -> BspResult<()> {
        period_for_rate(self.rate_hz)?;
        ensure(self.window_size > 0, "spikes.window_size", "must be at least 1")?;
        ensure(self.threshold > 0.0, "spikes.threshold", "must be positive")?;
        ensure(self.grip_ms > 0, "spikes.grip_ms", "must be positive")?;
        ensure(self.rising_period_us > 0, "spikes.rising_period_us", "must be positive")
    }
}

impl HeartbeatConfig {
    pub fn validate(&self) -> BspResult<()> {
        period_for_rate(self.rate_hz)?;
        ensure(self.window_size > 0, "heartbeat.window_size", "must be at least 1")?;
        ensure(self.range_threshold > 0, "heartbeat.range_threshold", "must be positive")?;
        ensure(self.large_box_ms > 0, "heartbeat.large_box_ms", "must be positive")?;
        ensure(self.small_box_ms > 0, "heartbeat.small_box_ms", "must be positive")?;
        ensure(
            self.small_box_ms <= self.large_box_ms,
            "heartbeat.small_box_ms",
            "must not exceed large_box_ms",
        )
    }

    /// Samples skipped after each detected beat
    pub fn refractory_samples(&self) -> usize {
        self.refractory_windows * self.window_size
    }
}

impl VerticalGazeConfig {
    pub fn validate(&self) -> BspResult<()> {
        period_for_rate(self.rate_hz)?;
        ensure(self.blink_window() >= 2, "vertical_gaze.rate_hz", "must give a blink window of at least 2 samples")?;
        ensure(self.updown_window > 0, "vertical_gaze.updown_window", "must be at least 1")?;
        ensure(self.blink_slope < 0.0, "vertical_gaze.blink_slope", "must be negative")?;
        validate_band(self.baseline, self.up_ratio, self.down_ratio)
    }

    /// Blink delay line holds a third of a second of samples
    pub fn blink_window(&self) -> usize {
        (self.rate_hz / 3.0).floor() as usize
    }

    /// Iterations up/down stays suppressed after a blink
    pub fn cooldown_period(&self) -> usize {
        self.blink_window() + self.updown_window
    }
}

impl HorizontalGazeConfig {
    pub fn validate(&self) -> BspResult<()> {
        period_for_rate(self.rate_hz)?;
        ensure(self.window_size > 0, "horizontal_gaze.window_size", "must be at least 1")?;
        validate_band(self.baseline, self.left_ratio, self.right_ratio)
    }
}

impl BlinkConfig {
    pub fn validate(&self) -> BspResult<()> {
        period_for_rate(self.rate_hz)?;
        ensure(self.check_ms > 0, "blink.check_ms", "must be positive")
    }
}

impl ReactionConfig {
    pub fn validate(&self) -> BspResult<()> {
        ensure(self.window_ms > 0, "reaction.window_ms", "must be positive")
    }
}

impl DetectorConfig {
    /// Validate every section
    pub fn validate(&self) -> BspResult<()> {
        self.calibration.validate()?;
        self.spikes.validate()?;
        self.heartbeat.validate()?;
        self.vertical_gaze.validate()?;
        self.horizontal_gaze.validate()?;
        self.blink.validate()?;
        self.reaction.validate()
    }

    /// Export configuration as pretty-printed JSON
    pub fn to_json(&self) -> BspResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BspError::ConfigurationError {
            message: format!("Failed to serialize configuration: {}", e),
        })
    }

    /// Import and validate configuration from JSON
    pub fn from_json(json: &str) -> BspResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| BspError::ConfigurationError {
            message: format!("Failed to deserialize configuration: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }
}
