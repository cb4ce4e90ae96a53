//! A complete acquisition session on the simulated board

use crate::scenario;
use anyhow::{Context, Result};
use bsp_core::{
    config_error, random_wait, Actuator, BspError, BspResult, Channel, Cue, HorizontalGaze, LoggedSource,
    MonotonicClock, ValueLogger, VerticalGaze,
};
use bsp_detectors::{
    BlinkDetector, DetectorConfig, HeartbeatDetector, HorizontalGazeClassifier, ReactionTimer,
    SpikeCounter, SpikeOutcome, ThresholdCalibrator, VerticalGazeClassifier,
};
use bsp_simulation::{BoardConfig, RecordingCuePresenter, SeededRandomizer, SimClock, SimServo, SimulatedBoard};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use uuid::Uuid;

/// Runner configuration: detector settings plus session shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub detectors: DetectorConfig,
    pub board: BoardConfig,
    /// Share of the calibrated EMG peak used as the spike threshold
    pub spike_threshold_percent: u32,
    pub spike_epoch_ms: u64,
    pub heart_epoch_ms: u64,
    pub gaze_epochs: usize,
    pub blink_epoch_ms: u64,
    pub reaction_trials: usize,
    /// Bounds of the random pause before each reaction trial
    pub min_wait_ms: u32,
    pub max_wait_ms: u32,
    /// Seed for the inter-trial randomizer
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            detectors: DetectorConfig::default(),
            board: BoardConfig::default(),
            spike_threshold_percent: 25,
            spike_epoch_ms: 3000,
            heart_epoch_ms: 5000,
            gaze_epochs: 8,
            blink_epoch_ms: 2000,
            reaction_trials: 4,
            min_wait_ms: 1000,
            max_wait_ms: 3000,
            seed: 7,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> BspResult<()> {
        self.detectors.validate()?;
        if self.spike_threshold_percent > 1000 {
            return Err(config_error!("spike_threshold_percent", "must be at most 1000"));
        }
        if self.min_wait_ms > self.max_wait_ms {
            return Err(config_error!("min_wait_ms", "must not exceed max_wait_ms"));
        }
        Ok(())
    }

    /// Parse and validate a session file
    pub fn from_json(json: &str) -> BspResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| BspError::ConfigurationError {
            message: format!("Failed to deserialize session configuration: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Classification of one gaze epoch and where it left the servo
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GazeReading {
    pub vertical: VerticalGaze,
    pub horizontal: HorizontalGaze,
    pub servo_angle: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReactionTrial {
    pub cue: Cue,
    pub wait_ms: u32,
    pub reaction_ms: Option<u64>,
}

/// Everything a session measured
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub threshold: Option<f32>,
    pub spikes: Option<SpikeOutcome>,
    pub spike_code: Option<i32>,
    pub heart_rate_bpm: Option<f32>,
    pub gaze: Vec<GazeReading>,
    pub blink: Option<bool>,
    pub reactions: Vec<ReactionTrial>,
    pub virtual_ms: u64,
    pub completed: bool,
}

impl SessionReport {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            threshold: None,
            spikes: None,
            spike_code: None,
            heart_rate_bpm: None,
            gaze: Vec::new(),
            blink: None,
            reactions: Vec::new(),
            virtual_ms: 0,
            completed: false,
        }
    }
}

/// Servo target for a vertical classification; `None` leaves it in place
pub fn vertical_angle(gaze: VerticalGaze) -> Option<u8> {
    match gaze {
        VerticalGaze::Up => Some(180),
        VerticalGaze::Down => Some(0),
        VerticalGaze::Blink => Some(90),
        VerticalGaze::None => None,
    }
}

pub fn horizontal_angle(gaze: HorizontalGaze) -> Option<u8> {
    match gaze {
        HorizontalGaze::Left => Some(180),
        HorizontalGaze::Right => Some(0),
        HorizontalGaze::None => None,
    }
}

fn cancelled(cancel: &AtomicBool) -> bool {
    let stop = cancel.load(Ordering::Relaxed);
    if stop {
        warn!("session cancelled");
    }
    stop
}

/// Run every phase in order, checking `cancel` between phases.
///
/// A cancelled session still returns the phases that finished, with
/// `completed` left false. The last value read on each channel goes to
/// `logger` when the session ends.
pub fn run_session<L: ValueLogger>(
    config: &SessionConfig,
    cancel: &AtomicBool,
    logger: &mut L,
) -> Result<SessionReport> {
    config.validate().context("invalid session configuration")?;
    let detectors = &config.detectors;

    let calibrator = ThresholdCalibrator::new(detectors.calibration.clone())?;
    let heartbeat = HeartbeatDetector::new(detectors.heartbeat.clone())?;
    let mut vertical = VerticalGazeClassifier::new(detectors.vertical_gaze.clone())?;
    let mut horizontal = HorizontalGazeClassifier::new(detectors.horizontal_gaze.clone())?;
    let blink_detector = BlinkDetector::new(detectors.blink.clone())?;
    let reaction_timer = ReactionTimer::new(detectors.reaction.clone())?;

    let clock = SimClock::new();
    let board = SimulatedBoard::new(clock.clone(), config.board.clone())
        .context("failed to create simulated board")?;
    let mut source = LoggedSource::new(board);
    let mut presenter = RecordingCuePresenter::new(clock.clone());
    let mut servo = SimServo::new();
    let mut rng = SeededRandomizer::new(config.seed);
    let mut report = SessionReport::new();

    info!(id = %report.id, "session started");
    scenario::baseline(source.inner_mut());

    let threshold = calibrator.calibrate_for(
        &mut source,
        &clock,
        detectors.calibration.duration_ms,
        config.spike_threshold_percent,
    );
    report.threshold = Some(threshold);
    if cancelled(cancel) {
        return Ok(finish(report, &source, &clock, logger));
    }

    let mut spike_config = detectors.spikes.clone();
    if threshold > 0.0 {
        spike_config.threshold = threshold;
    } else {
        warn!(configured = spike_config.threshold, "flat calibration, keeping configured spike threshold");
    }
    let spike_counter = SpikeCounter::new(spike_config).context("invalid calibrated spike threshold")?;

    let spikes = spike_counter.count_spikes(&mut source, &clock, config.spike_epoch_ms);
    report.spikes = Some(spikes);
    report.spike_code = Some(spikes.legacy_code());
    if cancelled(cancel) {
        return Ok(finish(report, &source, &clock, logger));
    }

    report.heart_rate_bpm = heartbeat.heart_rate(&mut source, &clock, config.heart_epoch_ms);
    if cancelled(cancel) {
        return Ok(finish(report, &source, &clock, logger));
    }

    scenario::gaze(source.inner_mut(), clock.now_millis_f64());
    for _ in 0..config.gaze_epochs {
        let v = vertical.classify(&mut source, &clock);
        if let Some(angle) = vertical_angle(v) {
            servo.set_angle(angle);
        }
        let h = horizontal.classify(&mut source, &clock);
        if let Some(angle) = horizontal_angle(h) {
            servo.set_angle(angle);
        }
        report.gaze.push(GazeReading {
            vertical: v,
            horizontal: h,
            servo_angle: servo.angle(),
        });
        if cancelled(cancel) {
            return Ok(finish(report, &source, &clock, logger));
        }
    }

    scenario::blink(source.inner_mut(), clock.now_millis_f64());
    report.blink = Some(blink_detector.detect(&mut source, &clock, config.blink_epoch_ms));
    if cancelled(cancel) {
        return Ok(finish(report, &source, &clock, logger));
    }

    for trial in 0..config.reaction_trials {
        let wait_ms = random_wait(&clock, &mut rng, config.min_wait_ms, config.max_wait_ms);
        let cue = if trial % 2 == 0 { Cue::Visual } else { Cue::Audio };
        let cue_end_ms = clock.now_millis_f64() + detectors.reaction.cue_ms as f64;
        scenario::respond_after(source.inner_mut(), cue_end_ms, 250.0);

        let reaction_ms = reaction_timer.reaction_time(&mut source, &clock, &mut presenter, Some(cue));
        report.reactions.push(ReactionTrial { cue, wait_ms, reaction_ms });
        if cancelled(cancel) {
            return Ok(finish(report, &source, &clock, logger));
        }
    }

    report.completed = true;
    Ok(finish(report, &source, &clock, logger))
}

fn finish<L: ValueLogger>(
    mut report: SessionReport,
    source: &LoggedSource<SimulatedBoard>,
    clock: &SimClock,
    logger: &mut L,
) -> SessionReport {
    source.flush(logger);
    report.virtual_ms = clock.now_millis();
    info!(
        id = %report.id,
        completed = report.completed,
        virtual_ms = report.virtual_ms,
        last_emg = ?source.last_value(Channel::Emg),
        "session finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsp_simulation::MemoryValueLogger;

    fn short_config() -> SessionConfig {
        SessionConfig {
            gaze_epochs: 4,
            reaction_trials: 2,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_full_session() {
        let cancel = AtomicBool::new(false);
        let mut telemetry = MemoryValueLogger::default();
        let report = run_session(&short_config(), &cancel, &mut telemetry).unwrap();

        assert!(report.completed);
        // 25% of the 600-count clench peak
        assert_eq!(report.threshold, Some(150.0));
        assert!(matches!(report.spikes, Some(SpikeOutcome::Spikes(n)) if n >= 3));
        assert!(report.heart_rate_bpm.is_some());

        assert_eq!(report.gaze.len(), 4);
        assert!(report.gaze.iter().any(|g| g.vertical == VerticalGaze::Up));
        assert!(report.gaze.iter().any(|g| g.horizontal == HorizontalGaze::Left));
        assert!(report.gaze.iter().any(|g| g.servo_angle == Some(180)));

        assert_eq!(report.blink, Some(true));

        assert_eq!(report.reactions.len(), 2);
        assert_eq!(report.reactions[0].cue, Cue::Visual);
        assert_eq!(report.reactions[1].cue, Cue::Audio);
        for trial in &report.reactions {
            assert!((1000..=3000).contains(&trial.wait_ms));
            assert!(matches!(trial.reaction_ms, Some(ms) if (249..=251).contains(&ms)));
        }

        let channels: Vec<Channel> = telemetry.records().iter().map(|&(channel, _)| channel).collect();
        assert_eq!(channels, vec![Channel::Emg, Channel::Ecg, Channel::Eog]);
        // Blink phase stops on the drop; the last reaction window ends at rest
        assert!(telemetry.records().contains(&(Channel::Eog, 380)));
        assert!(telemetry.records().contains(&(Channel::Emg, 20)));
    }

    #[test]
    fn test_calibrated_threshold_drives_spike_phase() {
        let config = SessionConfig {
            spike_threshold_percent: 200,
            ..short_config()
        };
        let cancel = AtomicBool::new(false);
        let mut telemetry = MemoryValueLogger::default();
        let report = run_session(&config, &cancel, &mut telemetry).unwrap();

        // Twice the burst peak is out of reach of the smoothed signal
        assert_eq!(report.threshold, Some(1200.0));
        assert_eq!(report.spikes, Some(SpikeOutcome::Spikes(0)));
    }

    #[test]
    fn test_cancelled_session_stops_after_first_phase() {
        let cancel = AtomicBool::new(true);
        let mut telemetry = MemoryValueLogger::default();
        let report = run_session(&short_config(), &cancel, &mut telemetry).unwrap();

        assert!(!report.completed);
        assert!(report.threshold.is_some());
        assert!(report.spikes.is_none());
        assert!(report.gaze.is_empty());

        let channels: Vec<Channel> = telemetry.records().iter().map(|&(channel, _)| channel).collect();
        assert_eq!(channels, vec![Channel::Emg]);
    }

    #[test]
    fn test_servo_mapping() {
        assert_eq!(vertical_angle(VerticalGaze::Up), Some(180));
        assert_eq!(vertical_angle(VerticalGaze::Blink), Some(90));
        assert_eq!(vertical_angle(VerticalGaze::None), None);
        assert_eq!(horizontal_angle(HorizontalGaze::Right), Some(0));
    }

    #[test]
    fn test_config_json() {
        let config = SessionConfig::from_json(r#"{ "gaze_epochs": 2, "detectors": { "blink": { "check_ms": 200 } } }"#).unwrap();
        assert_eq!(config.gaze_epochs, 2);
        assert_eq!(config.detectors.blink.check_ms, 200);
        assert_eq!(config.reaction_trials, 4);

        let inverted = r#"{ "min_wait_ms": 5000, "max_wait_ms": 1000 }"#;
        assert!(SessionConfig::from_json(inverted).is_err());
        assert!(SessionConfig::from_json(r#"{ "spike_threshold_percent": 5000 }"#).is_err());
    }
}
