//! Gaze direction from electrooculography
//!
//! Both axes compare a moving average against a band around a fixed
//! baseline and latch the direction they report. A latched direction is
//! only released after the signal has swung the other way (the eye
//! returning to center) and then settled inside the band, so a single
//! look is reported once however many epochs it spans.
//!
//! Classifiers are long-lived: latch state and sample history carry over
//! from one `classify` call to the next.

use crate::config::{HorizontalGazeConfig, VerticalGazeConfig};
use bsp_core::{
    BspResult, HorizontalGaze, MonotonicClock, SampleClock, SampleSource,
    SlidingWindow, VerticalGaze,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Side of the neutral band an excursion landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Excursion {
    Positive,
    Negative,
}

/// Latch state for one gaze axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazeAxisState {
    pub currently_positive: bool,
    pub currently_negative: bool,
    pub center_crossed: bool,
}

impl GazeAxisState {
    /// Feed one averaged level; returns a newly latched excursion
    pub fn update(&mut self, mean: f32, positive_level: f32, negative_level: f32) -> Option<Excursion> {
        if mean > positive_level {
            if self.currently_negative {
                self.center_crossed = true;
                None
            } else if self.currently_positive {
                None
            } else {
                self.currently_positive = true;
                self.center_crossed = false;
                Some(Excursion::Positive)
            }
        } else if mean < negative_level {
            if self.currently_positive {
                self.center_crossed = true;
                None
            } else if self.currently_negative {
                None
            } else {
                self.currently_negative = true;
                self.center_crossed = false;
                Some(Excursion::Negative)
            }
        } else {
            if self.center_crossed {
                debug!(mean, "gaze back at center, releasing latch");
                *self = Self::default();
            }
            None
        }
    }

    /// True while either direction is latched
    pub fn is_latched(&self) -> bool {
        self.currently_positive || self.currently_negative
    }
}

/// Up/down/blink classifier for the vertical EOG axis.
///
/// Raw samples go through a blink delay line (a third of a second long)
/// before reaching the up/down averaging window, so the blink slope is
/// always computed on samples newer than those being averaged.
#[derive(Debug, Clone)]
pub struct VerticalGazeClassifier {
    config: VerticalGazeConfig,
    sample_clock: SampleClock,
    state: GazeAxisState,
    blink_window: SlidingWindow,
    updown_window: SlidingWindow,
    cooldown_counter: usize,
    cooldown_period: usize,
}

impl VerticalGazeClassifier {
    pub fn new(config: VerticalGazeConfig) -> BspResult<Self> {
        config.validate()?;
        let sample_clock = SampleClock::from_rate_hz(config.rate_hz)?;
        let blink_window = SlidingWindow::try_with_capacity(config.blink_window())?;
        let updown_window = SlidingWindow::try_with_capacity(config.updown_window)?;
        let cooldown_period = config.cooldown_period();

        Ok(Self {
            config,
            sample_clock,
            state: GazeAxisState::default(),
            blink_window,
            updown_window,
            cooldown_counter: cooldown_period,
            cooldown_period,
        })
    }

    pub fn config(&self) -> &VerticalGazeConfig {
        &self.config
    }

    pub fn state(&self) -> &GazeAxisState {
        &self.state
    }

    /// True while up/down evaluation is suppressed after a blink
    pub fn in_cooldown(&self) -> bool {
        self.cooldown_counter < self.cooldown_period
    }

    /// Forget latches and sample history
    pub fn reset(&mut self) {
        self.state = GazeAxisState::default();
        self.blink_window.clear();
        self.updown_window.clear();
        self.cooldown_counter = self.cooldown_period;
    }

    /// Run one epoch and return the last event seen in it
    pub fn classify<S, C>(&mut self, source: &mut S, clock: &C) -> VerticalGaze
    where
        S: SampleSource,
        C: MonotonicClock,
    {
        let up_level = self.config.baseline * self.config.up_ratio;
        let down_level = self.config.baseline * self.config.down_ratio;
        let mut result = VerticalGaze::None;
        let mut sample_clock = self.sample_clock.clone();

        let start = clock.now_millis();
        sample_clock.start(clock);

        while clock.now_millis().saturating_sub(start) < self.config.epoch_ms {
            sample_clock.wait(clock);
            let value = source.read(self.config.channel);
            if let Some(delayed) = self.blink_window.push(value) {
                self.updown_window.push(delayed);
            }
            if !self.updown_window.is_full() {
                continue;
            }

            let slope = self.blink_window.slope().unwrap_or_default();
            if slope < self.config.blink_slope {
                debug!(slope, "blink");
                result = VerticalGaze::Blink;
                self.cooldown_counter = 0;
                continue;
            }

            if self.cooldown_counter < self.cooldown_period {
                self.cooldown_counter += 1;
                continue;
            }

            let mean = self.updown_window.mean().unwrap_or_default();
            match self.state.update(mean, up_level, down_level) {
                Some(Excursion::Positive) => {
                    debug!(mean, "gaze up");
                    result = VerticalGaze::Up;
                }
                Some(Excursion::Negative) => {
                    debug!(mean, "gaze down");
                    result = VerticalGaze::Down;
                }
                None => {}
            }
        }

        info!(%result, latched = self.state.is_latched(), "vertical gaze epoch complete");
        result
    }
}

/// Left/right classifier for the horizontal EOG axis
#[derive(Debug, Clone)]
pub struct HorizontalGazeClassifier {
    config: HorizontalGazeConfig,
    sample_clock: SampleClock,
    state: GazeAxisState,
    window: SlidingWindow,
}

impl HorizontalGazeClassifier {
    pub fn new(config: HorizontalGazeConfig) -> BspResult<Self> {
        config.validate()?;
        let sample_clock = SampleClock::from_rate_hz(config.rate_hz)?;
        let window = SlidingWindow::try_with_capacity(config.window_size)?;

        Ok(Self {
            config,
            sample_clock,
            state: GazeAxisState::default(),
            window,
        })
    }

    pub fn config(&self) -> &HorizontalGazeConfig {
        &self.config
    }

    pub fn state(&self) -> &GazeAxisState {
        &self.state
    }

    /// Forget latches and sample history
    pub fn reset(&mut self) {
        self.state = GazeAxisState::default();
        self.window.clear();
    }

    /// Run one epoch and return the last event seen in it
    pub fn classify<S, C>(&mut self, source: &mut S, clock: &C) -> HorizontalGaze
    where
        S: SampleSource,
        C: MonotonicClock,
    {
        let left_level = self.config.baseline * self.config.left_ratio;
        let right_level = self.config.baseline * self.config.right_ratio;
        let mut result = HorizontalGaze::None;
        let mut sample_clock = self.sample_clock.clone();

        let start = clock.now_millis();
        sample_clock.start(clock);

        while clock.now_millis().saturating_sub(start) < self.config.epoch_ms {
            sample_clock.wait(clock);
            self.window.push(source.read(self.config.channel));
            if !self.window.is_full() {
                continue;
            }

            let mean = self.window.mean().unwrap_or_default();
            match self.state.update(mean, left_level, right_level) {
                Some(Excursion::Positive) => {
                    debug!(mean, "gaze left");
                    result = HorizontalGaze::Left;
                }
                Some(Excursion::Negative) => {
                    debug!(mean, "gaze right");
                    result = HorizontalGaze::Right;
                }
                None => {}
            }
        }

        info!(%result, latched = self.state.is_latched(), "horizontal gaze epoch complete");
        result
    }
}

impl Default for VerticalGazeClassifier {
    fn default() -> Self {
        Self::new(VerticalGazeConfig::default()).expect("default vertical gaze configuration is valid")
    }
}

impl Default for HorizontalGazeClassifier {
    fn default() -> Self {
        Self::new(HorizontalGazeConfig::default()).expect("default horizontal gaze configuration is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsp_core::Channel;
    use bsp_simulation::{Segment, SignalPattern, SimClock, SimulatedBoard};

    fn eog_board(clock: &SimClock, segments: Vec<Segment>) -> SimulatedBoard {
        SimulatedBoard::noiseless(clock.clone()).with_pattern(
            Channel::Eog,
            SignalPattern::Script { baseline: 450.0, segments },
        )
    }

    fn vertical_epochs(
        classifier: &mut VerticalGazeClassifier,
        board: &mut SimulatedBoard,
        clock: &SimClock,
        epochs: usize,
    ) -> Vec<VerticalGaze> {
        (0..epochs).map(|_| classifier.classify(board, clock)).collect()
    }

    fn horizontal_epochs(
        classifier: &mut HorizontalGazeClassifier,
        board: &mut SimulatedBoard,
        clock: &SimClock,
        epochs: usize,
    ) -> Vec<HorizontalGaze> {
        (0..epochs).map(|_| classifier.classify(board, clock)).collect()
    }

    #[test]
    fn test_axis_latch_cycle() {
        let mut state = GazeAxisState::default();

        assert_eq!(state.update(700.0, 630.0, 270.0), Some(Excursion::Positive));
        assert_eq!(state.update(700.0, 630.0, 270.0), None);
        // Neutral without a return swing keeps the latch
        assert_eq!(state.update(450.0, 630.0, 270.0), None);
        assert!(state.currently_positive);

        // Return swing marks the crossing without reporting "down"
        assert_eq!(state.update(200.0, 630.0, 270.0), None);
        assert!(state.center_crossed);

        assert_eq!(state.update(450.0, 630.0, 270.0), None);
        assert_eq!(state, GazeAxisState::default());

        assert_eq!(state.update(200.0, 630.0, 270.0), Some(Excursion::Negative));
    }

    #[test]
    fn test_vertical_up_latches_until_center_crossed() {
        let clock = SimClock::new();
        let mut board = eog_board(&clock, vec![
            Segment::new(1000.0, 1600.0, 700.0),
            Segment::new(1600.0, 2200.0, 200.0),
            Segment::new(3000.0, 3600.0, 700.0),
        ]);
        let mut classifier = VerticalGazeClassifier::default();

        let results = vertical_epochs(&mut classifier, &mut board, &clock, 7);

        assert_eq!(results, vec![
            VerticalGaze::None,
            VerticalGaze::None,
            VerticalGaze::Up,
            VerticalGaze::None,
            VerticalGaze::None,
            VerticalGaze::None,
            VerticalGaze::Up,
        ]);
    }

    #[test]
    fn test_vertical_up_not_reemitted_without_return_swing() {
        let clock = SimClock::new();
        let mut board = eog_board(&clock, vec![
            Segment::new(1000.0, 1600.0, 700.0),
            Segment::new(2400.0, 3000.0, 700.0),
        ]);
        let mut classifier = VerticalGazeClassifier::default();

        let results = vertical_epochs(&mut classifier, &mut board, &clock, 8);

        assert_eq!(results.iter().filter(|&&r| r == VerticalGaze::Up).count(), 1);
        assert_eq!(results[2], VerticalGaze::Up);
        assert!(classifier.state().currently_positive);
    }

    #[test]
    fn test_vertical_down() {
        let clock = SimClock::new();
        let mut board = eog_board(&clock, vec![Segment::new(1000.0, 1600.0, 200.0)]);
        let mut classifier = VerticalGazeClassifier::default();

        let results = vertical_epochs(&mut classifier, &mut board, &clock, 4);

        assert_eq!(results[2], VerticalGaze::Down);
        assert!(classifier.state().currently_negative);
    }

    #[test]
    fn test_vertical_blink_suppresses_gaze() {
        let clock = SimClock::new();
        let mut board = eog_board(&clock, vec![
            Segment::new(1000.0, 1160.0, 1000.0),
            Segment::new(1160.0, 1320.0, 50.0),
        ]);
        let mut classifier = VerticalGazeClassifier::default();

        let results = vertical_epochs(&mut classifier, &mut board, &clock, 5);

        assert_eq!(results, vec![
            VerticalGaze::None,
            VerticalGaze::None,
            VerticalGaze::Blink,
            VerticalGaze::None,
            VerticalGaze::None,
        ]);
        assert!(!classifier.state().is_latched());
        assert!(!classifier.in_cooldown());
    }

    #[test]
    fn test_vertical_state_persists_until_reset() {
        let clock = SimClock::new();
        let mut board = eog_board(&clock, vec![Segment::new(1000.0, 1600.0, 700.0)]);
        let mut classifier = VerticalGazeClassifier::default();

        vertical_epochs(&mut classifier, &mut board, &clock, 3);
        assert!(classifier.state().currently_positive);

        classifier.reset();
        assert_eq!(*classifier.state(), GazeAxisState::default());
        assert!(!classifier.in_cooldown());
    }

    #[test]
    fn test_horizontal_left_then_right() {
        let clock = SimClock::new();
        let mut board = eog_board(&clock, vec![
            Segment::new(1000.0, 1500.0, 600.0),
            Segment::new(1500.0, 1900.0, 250.0),
            Segment::new(3000.0, 3500.0, 250.0),
        ]);
        let mut classifier = HorizontalGazeClassifier::default();

        let results = horizontal_epochs(&mut classifier, &mut board, &clock, 7);

        assert_eq!(results, vec![
            HorizontalGaze::None,
            HorizontalGaze::None,
            HorizontalGaze::Left,
            HorizontalGaze::None,
            HorizontalGaze::None,
            HorizontalGaze::None,
            HorizontalGaze::Right,
        ]);
        assert!(classifier.state().currently_negative);
    }

    #[test]
    fn test_horizontal_neutral_signal() {
        let clock = SimClock::new();
        let mut board = eog_board(&clock, vec![Segment::new(1000.0, 2000.0, 520.0)]);
        let mut classifier = HorizontalGazeClassifier::default();

        let results = horizontal_epochs(&mut classifier, &mut board, &clock, 5);

        assert!(results.iter().all(|&r| r == HorizontalGaze::None));
    }

    #[test]
    fn test_invalid_band_rejected() {
        let config = VerticalGazeConfig { up_ratio: 0.5, ..VerticalGazeConfig::default() };
        assert!(VerticalGazeClassifier::new(config).is_err());
    }
}
