//! BSP-Simulation: virtual acquisition hardware
//!
//! Deterministic clock, synthetic channel waveforms and recording
//! peripherals for exercising the detectors without a board attached.

pub mod clock;
pub mod signal_patterns;
pub mod board;
pub mod peripherals;

pub use clock::*;
pub use signal_patterns::*;
pub use board::*;
pub use peripherals::*;
