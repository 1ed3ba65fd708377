//! Temporal smoothing of noisy point measurements.

use std::collections::VecDeque;

use nalgebra::{Point2, Vector2};

/// Sliding-window mean over a fixed history of 2D points (FIR low-pass filter).
///
/// All points are weighted equally. Larger windows trade responsiveness for stability.
#[derive(Clone)]
pub struct SlidingMean {
    history: VecDeque<Point2<f32>>,
    /// Max. number of points to keep in the history.
    history_size: usize,
}

impl SlidingMean {
    /// Creates a new sliding mean over the last `history_size` points.
    pub fn new(history_size: usize) -> Self {
        assert!(history_size > 0);
        Self {
            history: VecDeque::with_capacity(history_size),
            history_size,
        }
    }

    /// Records a new raw observation, evicting the oldest one once the window is full.
    pub fn push(&mut self, point: Point2<f32>) {
        self.history.push_back(point);

        if self.history.len() > self.history_size {
            self.history.pop_front();
        }
    }

    /// Returns the arithmetic mean of the points currently in the window.
    ///
    /// Returns `None` while the window is empty; a default point is never fabricated.
    pub fn mean(&self) -> Option<Point2<f32>> {
        if self.history.is_empty() {
            return None;
        }

        let factor = 1.0 / self.history.len() as f32;
        let sum = self
            .history
            .iter()
            .fold(Vector2::zeros(), |acc, p| acc + p.coords * factor);
        Some(Point2::from(sum))
    }

    /// Resets the window to be identical to the state just after construction.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point2<f32> {
        Point2::new(x, y)
    }

    #[test]
    fn empty_window_is_unavailable() {
        let mean = SlidingMean::new(5);
        assert_eq!(mean.mean(), None);
    }

    #[test]
    fn partial_window_averages_what_it_has() {
        let mut mean = SlidingMean::new(5);
        mean.push(p(1.0, 1.0));
        assert_eq!(mean.mean(), Some(p(1.0, 1.0)));

        mean.push(p(3.0, 5.0));
        assert_eq!(mean.mean(), Some(p(2.0, 3.0)));

        mean.push(p(2.0, 0.0));
        assert_eq!(mean.mean(), Some(p(2.0, 2.0)));
    }

    #[test]
    fn full_window_evicts_oldest() {
        let mut mean = SlidingMean::new(5);
        mean.push(p(100.0, 100.0));
        for _ in 0..5 {
            mean.push(p(10.0, 20.0));
        }

        // The 6th push evicted the outlier entirely.
        assert_eq!(mean.mean(), Some(p(10.0, 20.0)));
    }

    #[test]
    fn reset_empties_the_window() {
        let mut mean = SlidingMean::new(2);
        mean.push(p(1.0, 2.0));
        mean.reset();
        assert_eq!(mean.mean(), None);
    }
}
