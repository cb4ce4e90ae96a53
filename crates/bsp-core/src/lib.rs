//! BSP-Core: Foundation types for biosignal event detection
//!
//! Samples, channels, the hardware abstraction traits, sample pacing and
//! the sliding window every detector builds on.

pub mod error;
pub mod types;
pub mod hal;
pub mod sample_clock;
pub mod window;
pub mod delay;

pub use error::{BspError, BspResult};
pub use types::*;
pub use hal::{
    Actuator, CuePresenter, LoggedSource, MonotonicClock, Randomizer, SampleSource, StdClock,
    TracingValueLogger, ValueLogger,
};
pub use sample_clock::{period_for_rate, SampleClock};
pub use window::SlidingWindow;
pub use delay::random_wait;
