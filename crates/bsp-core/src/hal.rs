//! Hardware abstraction layer
//!
//! Traits for the collaborators every detector leans on: analog inputs,
//! monotonic time, cue output, the servo, randomness and telemetry.

use crate::types::{Channel, Sample};
use std::time::{Duration, Instant};
use tracing::info;

/// Source of raw ADC samples, one channel at a time
pub trait SampleSource {
    /// Read the current value of `channel`
    fn read(&mut self, channel: Channel) -> Sample;
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    fn read(&mut self, channel: Channel) -> Sample {
        (**self).read(channel)
    }
}

/// Monotonic time with millisecond and microsecond resolution
pub trait MonotonicClock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_millis(&self) -> u64;

    /// Microseconds since the same origin
    fn now_micros(&self) -> u64;

    /// Block the caller for `micros` microseconds
    fn sleep_micros(&self, micros: u64);
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for &C {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }

    fn now_micros(&self) -> u64 {
        (**self).now_micros()
    }

    fn sleep_micros(&self, micros: u64) {
        (**self).sleep_micros(micros)
    }
}

/// Visual and auditory stimulus output
pub trait CuePresenter {
    /// Show the cue icon for `duration_ms`
    fn show_icon(&mut self, duration_ms: u64);

    /// Play the cue tone for `duration_ms`
    fn play_tone(&mut self, duration_ms: u64);
}

/// Single-angle servo output
pub trait Actuator {
    /// Move to `degrees` (0-180)
    fn set_angle(&mut self, degrees: u8);
}

/// Inclusive-range integer draws
pub trait Randomizer {
    /// Uniform value in `min..=max`
    fn between(&mut self, min: u32, max: u32) -> u32;
}

/// Sink for per-channel telemetry values
pub trait ValueLogger {
    /// Record the last value seen on `channel`
    fn log_value(&mut self, channel: Channel, value: Sample);
}

/// Wall clock backed by [`std::time::Instant`]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for StdClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn now_micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }

    fn sleep_micros(&self, micros: u64) {
        if micros > 0 {
            std::thread::sleep(Duration::from_micros(micros));
        }
    }
}

/// Telemetry logger that emits one `tracing` record per value
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingValueLogger;

impl ValueLogger for TracingValueLogger {
    fn log_value(&mut self, channel: Channel, value: Sample) {
        info!(channel = channel.label(), value, "channel value");
    }
}

/// Wraps a [`SampleSource`] and remembers the last value read per channel
#[derive(Debug)]
pub struct LoggedSource<S> {
    inner: S,
    last: [Option<Sample>; 4],
}

impl<S: SampleSource> LoggedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            last: [None; 4],
        }
    }

    /// Last value read from `channel`, if any
    pub fn last_value(&self, channel: Channel) -> Option<Sample> {
        self.last[channel.index()]
    }

    /// Report every channel read so far to `logger`
    pub fn flush<L: ValueLogger>(&self, logger: &mut L) {
        for channel in Channel::ALL {
            if let Some(value) = self.last_value(channel) {
                logger.log_value(channel, value);
            }
        }
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: SampleSource> SampleSource for LoggedSource<S> {
    fn read(&mut self, channel: Channel) -> Sample {
        let value = self.inner.read(channel);
        self.last[channel.index()] = Some(value);
        value
    }
}
