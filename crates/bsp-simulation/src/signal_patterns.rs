//! Synthetic waveforms in ADC units for driving simulated channels

use std::f64::consts::PI;

/// A constant-level interval in a scripted waveform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start time in ms (inclusive)
    pub start_ms: f64,
    /// End time in ms (exclusive)
    pub end_ms: f64,
    /// Level held during the segment
    pub level: f32,
}

impl Segment {
    pub fn new(start_ms: f64, end_ms: f64, level: f32) -> Self {
        Self { start_ms, end_ms, level }
    }

    fn contains(&self, time_ms: f64) -> bool {
        time_ms >= self.start_ms && time_ms < self.end_ms
    }
}

/// Waveforms a simulated channel can produce
#[derive(Debug, Clone, PartialEq)]
pub enum SignalPattern {
    /// Flat line
    Constant { level: f32 },
    /// Baseline plus a sine wave
    Sinusoidal {
        frequency: f32,
        amplitude: f32,
        baseline: f32,
    },
    /// Linear ramp between two levels, flat before and after
    Ramp {
        start_level: f32,
        end_level: f32,
        start_ms: f64,
        duration_ms: f64,
    },
    /// Rectangular pulses repeating every `period_ms`, the first at `offset_ms`
    Pulses {
        baseline: f32,
        peak: f32,
        period_ms: f64,
        width_ms: f64,
        offset_ms: f64,
    },
    /// Baseline with explicit segments; the first matching segment wins
    Script {
        baseline: f32,
        segments: Vec<Segment>,
    },
}

impl SignalPattern {
    /// Level at `time_ms` after the start of the simulation
    pub fn value_at(&self, time_ms: f64) -> f32 {
        match self {
            SignalPattern::Constant { level } => *level,

            SignalPattern::Sinusoidal { frequency, amplitude, baseline } => {
                let phase = 2.0 * PI * *frequency as f64 * time_ms / 1000.0;
                baseline + amplitude * phase.sin() as f32
            },

            SignalPattern::Ramp { start_level, end_level, start_ms, duration_ms } => {
                if time_ms <= *start_ms {
                    *start_level
                } else if time_ms >= start_ms + duration_ms {
                    *end_level
                } else {
                    let progress = ((time_ms - start_ms) / duration_ms) as f32;
                    start_level + (end_level - start_level) * progress
                }
            },

            SignalPattern::Pulses { baseline, peak, period_ms, width_ms, offset_ms } => {
                if time_ms < *offset_ms || *period_ms <= 0.0 {
                    return *baseline;
                }
                let phase = (time_ms - offset_ms) % period_ms;
                if phase < *width_ms {
                    *peak
                } else {
                    *baseline
                }
            },

            SignalPattern::Script { baseline, segments } => segments
                .iter()
                .find(|segment| segment.contains(time_ms))
                .map(|segment| segment.level)
                .unwrap_or(*baseline),
        }
    }

    /// Get pattern description
    pub fn description(&self) -> &'static str {
        match self {
            SignalPattern::Constant { .. } => "Constant level",
            SignalPattern::Sinusoidal { .. } => "Sinusoidal drift",
            SignalPattern::Ramp { .. } => "Linear ramp",
            SignalPattern::Pulses { .. } => "Periodic pulses",
            SignalPattern::Script { .. } => "Scripted segments",
        }
    }

    /// Resting cardiac trace with beats every `60000 / bpm` ms
    pub fn heartbeat(bpm: f64) -> Self {
        SignalPattern::Pulses {
            baseline: 500.0,
            peak: 900.0,
            period_ms: 60_000.0 / bpm,
            width_ms: 40.0,
            offset_ms: 60_000.0 / bpm,
        }
    }

    /// Muscle bursts of `width_ms` every `period_ms`
    pub fn clench_bursts(period_ms: f64, width_ms: f64) -> Self {
        SignalPattern::Pulses {
            baseline: 20.0,
            peak: 600.0,
            period_ms,
            width_ms,
            offset_ms: period_ms,
        }
    }
}
