//! Recording stand-ins for the board's output peripherals

use crate::clock::SimClock;
use bsp_core::{Actuator, Channel, Cue, CuePresenter, MonotonicClock, Randomizer, Sample, ValueLogger};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A cue as it was presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentedCue {
    pub cue: Cue,
    pub at_ms: u64,
    pub duration_ms: u64,
}

/// Cue presenter that blocks for the cue duration on the virtual clock
#[derive(Debug, Clone)]
pub struct RecordingCuePresenter {
    clock: SimClock,
    presented: Vec<PresentedCue>,
}

impl RecordingCuePresenter {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            presented: Vec::new(),
        }
    }

    pub fn presented(&self) -> &[PresentedCue] {
        &self.presented
    }

    fn present(&mut self, cue: Cue, duration_ms: u64) {
        self.presented.push(PresentedCue {
            cue,
            at_ms: self.clock.now_millis(),
            duration_ms,
        });
        self.clock.sleep_micros(duration_ms * 1000);
    }
}

impl CuePresenter for RecordingCuePresenter {
    fn show_icon(&mut self, duration_ms: u64) {
        self.present(Cue::Visual, duration_ms);
    }

    fn play_tone(&mut self, duration_ms: u64) {
        self.present(Cue::Audio, duration_ms);
    }
}

/// Servo that remembers every commanded angle
#[derive(Debug, Clone, Default)]
pub struct SimServo {
    angles: Vec<u8>,
}

impl SimServo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent angle, if the servo was ever moved
    pub fn angle(&self) -> Option<u8> {
        self.angles.last().copied()
    }

    pub fn history(&self) -> &[u8] {
        &self.angles
    }
}

impl Actuator for SimServo {
    fn set_angle(&mut self, degrees: u8) {
        self.angles.push(degrees.min(180));
    }
}

/// Reproducible randomizer backed by a seeded [`rand::rngs::StdRng`]
#[derive(Debug, Clone)]
pub struct SeededRandomizer {
    rng: rand::rngs::StdRng,
}

impl SeededRandomizer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }
}

impl Randomizer for SeededRandomizer {
    fn between(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

/// Value logger that keeps every record in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryValueLogger {
    records: Vec<(Channel, Sample)>,
}

impl MemoryValueLogger {
    pub fn records(&self) -> &[(Channel, Sample)] {
        &self.records
    }
}

impl ValueLogger for MemoryValueLogger {
    fn log_value(&mut self, channel: Channel, value: Sample) {
        self.records.push((channel, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_presenter_blocks_on_virtual_clock() {
        let clock = SimClock::new();
        let mut cues = RecordingCuePresenter::new(clock.clone());

        cues.show_icon(100);
        cues.play_tone(50);

        assert_eq!(clock.now_millis(), 150);
        assert_eq!(
            cues.presented(),
            &[
                PresentedCue { cue: Cue::Visual, at_ms: 0, duration_ms: 100 },
                PresentedCue { cue: Cue::Audio, at_ms: 100, duration_ms: 50 },
            ]
        );
    }

    #[test]
    fn test_servo_clamps_angle() {
        let mut servo = SimServo::new();
        assert_eq!(servo.angle(), None);
        servo.set_angle(90);
        servo.set_angle(250);
        assert_eq!(servo.history(), &[90, 180]);
    }

    #[test]
    fn test_seeded_randomizer_stays_in_range() {
        let mut rng = SeededRandomizer::new(7);
        for _ in 0..200 {
            let v = rng.between(1000, 3000);
            assert!((1000..=3000).contains(&v));
        }
        assert_eq!(rng.between(5, 5), 5);
    }
}
