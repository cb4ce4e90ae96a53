//! Simulated four-channel acquisition board

use crate::clock::SimClock;
use crate::signal_patterns::SignalPattern;
use bsp_core::{BspError, BspResult, Channel, Sample, SampleSource, ADC_MAX};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the simulated board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Virtual time each ADC conversion takes, in microseconds
    pub read_cost_us: u64,
    /// Gaussian noise standard deviation in ADC counts (0.0 = no noise)
    pub noise_std: f32,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            read_cost_us: 100,
            noise_std: 0.0,
            seed: Some(0),
        }
    }
}

/// Board whose channels replay [`SignalPattern`]s against a [`SimClock`].
///
/// Every read samples the pattern at the current virtual time and then
/// advances the clock by the conversion cost, so unthrottled loops make
/// progress exactly as they would on hardware.
pub struct SimulatedBoard {
    clock: SimClock,
    config: BoardConfig,
    patterns: [SignalPattern; 4],
    rng: rand::rngs::StdRng,
    noise: Option<Normal<f32>>,
    reads: u64,
}

impl SimulatedBoard {
    /// Create a board with every channel flat at zero
    pub fn new(clock: SimClock, config: BoardConfig) -> BspResult<Self> {
        let noise = if config.noise_std > 0.0 {
            Some(Normal::new(0.0, config.noise_std).map_err(|e| BspError::SimulationError {
                message: format!("Failed to create normal distribution: {}", e),
            })?)
        } else if config.noise_std == 0.0 {
            None
        } else {
            return Err(BspError::SimulationError {
                message: format!("Noise standard deviation must not be negative: {}", config.noise_std),
            });
        };

        let seed = config.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default()
        });

        Ok(SimulatedBoard {
            clock,
            config,
            patterns: std::array::from_fn(|_| SignalPattern::Constant { level: 0.0 }),
            rng: rand::rngs::StdRng::seed_from_u64(seed),
            noise,
            reads: 0,
        })
    }

    /// Noise-free board with the default conversion cost
    pub fn noiseless(clock: SimClock) -> Self {
        SimulatedBoard {
            clock,
            config: BoardConfig::default(),
            patterns: std::array::from_fn(|_| SignalPattern::Constant { level: 0.0 }),
            rng: rand::rngs::StdRng::seed_from_u64(0),
            noise: None,
            reads: 0,
        }
    }

    /// Replace the waveform on `channel`
    pub fn set_pattern(&mut self, channel: Channel, pattern: SignalPattern) {
        debug!(%channel, pattern = pattern.description(), "channel pattern set");
        self.patterns[channel.index()] = pattern;
    }

    /// Builder form of [`set_pattern`](Self::set_pattern)
    pub fn with_pattern(mut self, channel: Channel, pattern: SignalPattern) -> Self {
        self.set_pattern(channel, pattern);
        self
    }

    pub fn pattern(&self, channel: Channel) -> &SignalPattern {
        &self.patterns[channel.index()]
    }

    /// Total conversions performed
    pub fn reads(&self) -> u64 {
        self.reads
    }

    fn quantize(value: f32) -> Sample {
        value.round().clamp(0.0, ADC_MAX as f32) as Sample
    }
}

impl SampleSource for SimulatedBoard {
    fn read(&mut self, channel: Channel) -> Sample {
        let time_ms = self.clock.now_millis_f64();
        let mut value = self.patterns[channel.index()].value_at(time_ms);

        if let Some(noise) = &self.noise {
            value += noise.sample(&mut self.rng);
        }

        self.reads += 1;
        self.clock.advance(self.config.read_cost_us);
        Self::quantize(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsp_core::MonotonicClock;

    #[test]
    fn test_read_advances_clock() {
        let clock = SimClock::new();
        let mut board = SimulatedBoard::noiseless(clock.clone())
            .with_pattern(Channel::Ecg, SignalPattern::Constant { level: 512.0 });

        assert_eq!(board.read(Channel::Ecg), 512);
        assert_eq!(board.read(Channel::Eeg), 0);
        assert_eq!(clock.now_micros(), 200);
        assert_eq!(board.reads(), 2);
    }

    #[test]
    fn test_values_clamped_to_adc_range() {
        let clock = SimClock::new();
        let mut board = SimulatedBoard::noiseless(clock)
            .with_pattern(Channel::Emg, SignalPattern::Constant { level: 5000.0 })
            .with_pattern(Channel::Eog, SignalPattern::Constant { level: -40.0 });

        assert_eq!(board.read(Channel::Emg), ADC_MAX);
        assert_eq!(board.read(Channel::Eog), 0);
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let config = BoardConfig { noise_std: 8.0, seed: Some(42), ..BoardConfig::default() };
        let mut a = SimulatedBoard::new(SimClock::new(), config.clone()).unwrap()
            .with_pattern(Channel::Eeg, SignalPattern::Constant { level: 500.0 });
        let mut b = SimulatedBoard::new(SimClock::new(), config).unwrap()
            .with_pattern(Channel::Eeg, SignalPattern::Constant { level: 500.0 });

        let first: Vec<Sample> = (0..50).map(|_| a.read(Channel::Eeg)).collect();
        let second: Vec<Sample> = (0..50).map(|_| b.read(Channel::Eeg)).collect();
        assert_eq!(first, second);
        assert!(first.iter().any(|&v| v != 500));
    }

    #[test]
    fn test_negative_noise_rejected() {
        let config = BoardConfig { noise_std: -1.0, ..BoardConfig::default() };
        assert!(SimulatedBoard::new(SimClock::new(), config).is_err());
    }
}
