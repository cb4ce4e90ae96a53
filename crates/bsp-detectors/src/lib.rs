//! BSP-Detectors: event detection on live biosignal channels
//!
//! Each detector owns its configuration and runs a bounded, blocking
//! acquisition epoch against a [`bsp_core::SampleSource`] paced by a
//! [`bsp_core::MonotonicClock`].

pub mod config;
pub mod calibration;
pub mod spikes;
pub mod heartbeat;
pub mod gaze;
pub mod blink;
pub mod reaction;

pub use config::{
    BlinkConfig, CalibrationConfig, DetectorConfig, HeartbeatConfig, HorizontalGazeConfig,
    ReactionConfig, SpikeConfig, VerticalGazeConfig,
};
pub use calibration::ThresholdCalibrator;
pub use spikes::{SpikeCounter, SpikeOutcome};
pub use heartbeat::{box_units, HeartbeatDetector};
pub use gaze::{Excursion, GazeAxisState, HorizontalGazeClassifier, VerticalGazeClassifier};
pub use blink::BlinkDetector;
pub use reaction::ReactionTimer;
