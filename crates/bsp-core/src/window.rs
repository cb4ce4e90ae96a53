//! Fixed-capacity FIFO of recent samples with streaming statistics

use crate::error::{BspError, BspResult};
use crate::types::Sample;
use std::collections::VecDeque;

/// Bounded sample history.
///
/// Once full, every push evicts the oldest sample. The sums behind
/// [`mean`](Self::mean) and [`slope`](Self::slope) are updated on each push,
/// so both are O(1); `min`/`max` scan the (small) window.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    buffer: VecDeque<Sample>,
    capacity: usize,
    // Σy over current contents
    sum_y: i64,
    // Σ(i·y) with i the position from the oldest sample
    sum_xy: i64,
}

impl SlidingWindow {
    /// Create a window holding at most `capacity` samples.
    ///
    /// Panics if `capacity` is zero; use [`try_with_capacity`](Self::try_with_capacity)
    /// for capacities coming from configuration.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).expect("sliding window capacity must be at least 1")
    }

    /// Create a window, rejecting a zero capacity
    pub fn try_with_capacity(capacity: usize) -> BspResult<Self> {
        if capacity == 0 {
            return Err(BspError::InvalidWindowSize { requested: capacity });
        }

        Ok(Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            sum_y: 0,
            sum_xy: 0,
        })
    }

    /// Append a sample, returning the one evicted to make room
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        let evicted = if self.buffer.len() == self.capacity {
            self.buffer.pop_front().map(|old| {
                self.sum_y -= old as i64;
                // Every remaining sample moves one position towards the front
                self.sum_xy -= self.sum_y;
                old
            })
        } else {
            None
        };

        let y = sample as i64;
        self.sum_xy += self.buffer.len() as i64 * y;
        self.sum_y += y;
        self.buffer.push_back(sample);

        evicted
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.sum_y = 0;
        self.sum_xy = 0;
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        self.buffer.iter().copied()
    }

    /// Newest sample
    pub fn newest(&self) -> Option<Sample> {
        self.buffer.back().copied()
    }

    /// Oldest sample
    pub fn oldest(&self) -> Option<Sample> {
        self.buffer.front().copied()
    }

    /// Arithmetic mean of the current contents
    pub fn mean(&self) -> Option<f32> {
        if self.buffer.is_empty() {
            return None;
        }
        Some((self.sum_y as f64 / self.buffer.len() as f64) as f32)
    }

    pub fn min(&self) -> Option<Sample> {
        self.buffer.iter().copied().min()
    }

    pub fn max(&self) -> Option<Sample> {
        self.buffer.iter().copied().max()
    }

    /// Peak-to-peak amplitude
    pub fn range(&self) -> Option<Sample> {
        Some(self.max()? - self.min()?)
    }

    /// Least-squares slope of value against position (0 = oldest).
    ///
    /// `None` for fewer than two samples.
    pub fn slope(&self) -> Option<f32> {
        let n = self.buffer.len() as f64;
        if self.buffer.len() < 2 {
            return None;
        }

        let sum_x = n * (n - 1.0) / 2.0;
        let sum_x2 = (n - 1.0) * n * (2.0 * n - 1.0) / 6.0;
        let denominator = n * sum_x2 - sum_x * sum_x;
        if denominator == 0.0 {
            return None;
        }

        let numerator = n * self.sum_xy as f64 - sum_x * self.sum_y as f64;
        Some((numerator / denominator) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_slope(values: &[Sample]) -> f64 {
        let n = values.len() as f64;
        let (mut sx, mut sy, mut sxy, mut sx2) = (0.0, 0.0, 0.0, 0.0);
        for (i, &v) in values.iter().enumerate() {
            let x = i as f64;
            let y = v as f64;
            sx += x;
            sy += y;
            sxy += x * y;
            sx2 += x * x;
        }
        (n * sxy - sx * sy) / (n * sx2 - sx * sx)
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut window = SlidingWindow::with_capacity(3);
        assert_eq!(window.push(1), None);
        assert_eq!(window.push(2), None);
        assert_eq!(window.push(3), None);
        assert!(window.is_full());

        assert_eq!(window.push(4), Some(1));
        assert_eq!(window.len(), 3);
        assert_eq!(window.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut window = SlidingWindow::with_capacity(5);
        for i in 0..100 {
            window.push(i);
            assert!(window.len() <= 5);
        }
    }

    #[test]
    fn test_mean_tracks_contents() {
        let mut window = SlidingWindow::with_capacity(4);
        assert_eq!(window.mean(), None);

        let values: [Sample; 9] = [10, 20, 30, 40, 50, 7, 1023, 0, 512];
        for (i, &v) in values.iter().enumerate() {
            window.push(v);
            let start = (i + 1).saturating_sub(4);
            let expected: f32 = values[start..=i].iter().map(|&x| x as f32).sum::<f32>()
                / (i + 1 - start) as f32;
            assert!((window.mean().unwrap() - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_min_max_range() {
        let mut window = SlidingWindow::with_capacity(3);
        for v in [500, 100, 900, 300] {
            window.push(v);
        }
        assert_eq!(window.min(), Some(100));
        assert_eq!(window.max(), Some(900));
        assert_eq!(window.range(), Some(800));
    }

    #[test]
    fn test_slope_of_linear_sequence() {
        // y = 3x + 100 and y = -5x + 900, through several capacities
        for capacity in 2..=20 {
            let mut rising = SlidingWindow::with_capacity(capacity);
            let mut falling = SlidingWindow::with_capacity(capacity);
            for x in 0..60u16 {
                rising.push(3 * x + 100);
                falling.push(900 - 5 * x);
                if rising.len() >= 2 {
                    assert!((rising.slope().unwrap() - 3.0).abs() < 1e-4);
                    assert!((falling.slope().unwrap() + 5.0).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_slope_matches_direct_computation_after_eviction() {
        let mut window = SlidingWindow::with_capacity(6);
        let values: Vec<Sample> = vec![450, 460, 900, 880, 120, 100, 430, 455, 470, 20];
        for (i, &v) in values.iter().enumerate() {
            window.push(v);
            if window.len() >= 2 {
                let start = (i + 1).saturating_sub(6);
                let expected = naive_slope(&values[start..=i]);
                assert!((window.slope().unwrap() as f64 - expected).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_slope_needs_two_samples() {
        let mut window = SlidingWindow::with_capacity(4);
        assert_eq!(window.slope(), None);
        window.push(10);
        assert_eq!(window.slope(), None);
        window.push(12);
        assert!((window.slope().unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            SlidingWindow::try_with_capacity(0).unwrap_err(),
            BspError::InvalidWindowSize { requested: 0 }
        );
    }

    #[test]
    fn test_clear_resets_statistics() {
        let mut window = SlidingWindow::with_capacity(3);
        window.push(5);
        window.push(9);
        window.clear();
        assert!(window.is_empty());
        window.push(2);
        window.push(4);
        assert_eq!(window.mean(), Some(3.0));
        assert!((window.slope().unwrap() - 2.0).abs() < 1e-6);
    }
}
