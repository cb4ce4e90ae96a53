//! Virtual monotonic time for deterministic detector runs

use bsp_core::MonotonicClock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Clock whose time only moves when something sleeps or advances it.
///
/// Clones share the same timeline, so a board and the detectors driving it
/// can each hold a handle.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    micros: Arc<AtomicU64>,
}

impl SimClock {
    /// Clock starting at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock starting at `micros`
    pub fn starting_at(micros: u64) -> Self {
        Self {
            micros: Arc::new(AtomicU64::new(micros)),
        }
    }

    /// Move time forward by `micros`
    pub fn advance(&self, micros: u64) {
        self.micros.fetch_add(micros, Ordering::SeqCst);
    }

    /// Current time in fractional milliseconds
    pub fn now_millis_f64(&self) -> f64 {
        self.micros.load(Ordering::SeqCst) as f64 / 1000.0
    }
}

impl MonotonicClock for SimClock {
    fn now_millis(&self) -> u64 {
        self.micros.load(Ordering::SeqCst) / 1000
    }

    fn now_micros(&self) -> u64 {
        self.micros.load(Ordering::SeqCst)
    }

    fn sleep_micros(&self, micros: u64) {
        self.advance(micros);
    }
}
