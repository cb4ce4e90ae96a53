//! Randomized blocking delay used between stimulus trials

use crate::hal::{MonotonicClock, Randomizer};
use tracing::debug;

/// Sleep for a random whole number of milliseconds in `min_ms..=max_ms`.
///
/// Bounds given in the wrong order are swapped. Returns the chosen delay.
pub fn random_wait<C, R>(clock: &C, rng: &mut R, min_ms: u32, max_ms: u32) -> u32
where
    C: MonotonicClock,
    R: Randomizer,
{
    let (low, high) = if min_ms <= max_ms { (min_ms, max_ms) } else { (max_ms, min_ms) };
    let delay_ms = rng.between(low, high);
    debug!(delay_ms, "random wait");
    clock.sleep_micros(delay_ms as u64 * 1000);
    delay_ms
}
