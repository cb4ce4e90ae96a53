//! Standalone blink detection on the EOG channel
//!
//! A blink shows up as a sharp rise followed, shortly after, by the
//! signal dropping below where the rise started.

use crate::config::BlinkConfig;
use bsp_core::{BspResult, MonotonicClock, Sample, SampleClock, SampleSource, SlidingWindow};
use tracing::{debug, info};

/// Pending rise waiting for its matching drop
#[derive(Debug, Clone, Copy)]
struct PendingRise {
    start_value: Sample,
    started_ms: u64,
}

#[derive(Debug, Clone)]
pub struct BlinkDetector {
    config: BlinkConfig,
    sample_clock: SampleClock,
}

impl BlinkDetector {
    pub fn new(config: BlinkConfig) -> BspResult<Self> {
        config.validate()?;
        let sample_clock = SampleClock::from_rate_hz(config.rate_hz)?;
        Ok(Self { config, sample_clock })
    }

    pub fn config(&self) -> &BlinkConfig {
        &self.config
    }

    /// Watch the channel for up to `duration_ms`; returns as soon as a
    /// blink completes.
    pub fn detect<S, C>(&self, source: &mut S, clock: &C, duration_ms: u64) -> bool
    where
        S: SampleSource,
        C: MonotonicClock,
    {
        let mut window = SlidingWindow::with_capacity(2);
        let mut sample_clock = self.sample_clock.clone();
        let mut pending: Option<PendingRise> = None;

        let start = clock.now_millis();
        sample_clock.start(clock);

        while clock.now_millis().saturating_sub(start) < duration_ms {
            sample_clock.wait(clock);
            window.push(source.read(self.config.channel));
            if !window.is_full() {
                continue;
            }
            let (Some(older), Some(newer)) = (window.oldest(), window.newest()) else {
                continue;
            };
            let now = clock.now_millis();

            match pending {
                None => {
                    if newer > older && newer - older > self.config.jump_threshold {
                        debug!(older, newer, "eye movement rise");
                        pending = Some(PendingRise { start_value: older, started_ms: now });
                    }
                }
                Some(rise) => {
                    if now.saturating_sub(rise.started_ms) >= self.config.check_ms {
                        debug!("rise not followed by a drop, cancelling");
                        pending = None;
                    } else if newer < rise.start_value {
                        info!(
                            start_value = rise.start_value,
                            value = newer,
                            after_ms = now - rise.started_ms,
                            "blink detected"
                        );
                        return true;
                    }
                }
            }
        }

        info!(duration_ms, "no blink");
        false
    }
}

impl Default for BlinkDetector {
    fn default() -> Self {
        Self::new(BlinkConfig::default()).expect("default blink configuration is valid")
    }
}
