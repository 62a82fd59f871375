//! Rolling means.
//!
//! A trailing window for projected minutes and a centered window for career curves.

use std::collections::VecDeque;

/// Trailing mean over the last `window` observations.
pub struct RollingMean {
    /// Window size in observations.
    window: usize,
    /// Values currently in the window.
    values: VecDeque<f64>,
    /// Running sum of the window.
    sum: f64,
}

impl RollingMean {
    /// Create a new trailing mean. A zero window is treated as one.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            values: VecDeque::with_capacity(window),
            sum: 0.0,
        }
    }

    /// Add an observation and return the current mean.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.values.len() >= self.window {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
        self.values.push_back(value);
        self.sum += value;
        self.sum / self.values.len() as f64
    }

    /// Current mean, if any observation was added.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.values.len() as f64)
        }
    }

    /// Number of observations in the window.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Centered rolling mean with partial windows at the edges.
///
/// For an even `window` the extra element sits after the center.
pub fn centered_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let before = (window - 1) / 2;
    let after = window - 1 - before;
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(before);
            let end = (i + after + 1).min(values.len());
            let slice = &values[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rolling_mean_drops_oldest() {
        let mut mean = RollingMean::new(3);
        assert!(mean.mean().is_none());
        mean.push(10.0);
        mean.push(20.0);
        assert_abs_diff_eq!(mean.push(30.0), 20.0);
        assert_abs_diff_eq!(mean.push(40.0), 30.0);
        assert_eq!(mean.len(), 3);
    }

    #[test]
    fn test_centered_mean_partial_edges() {
        let smoothed = centered_mean(&[1.0, 2.0, 3.0, 10.0], 3);
        assert_abs_diff_eq!(smoothed[0], 1.5);
        assert_abs_diff_eq!(smoothed[1], 2.0);
        assert_abs_diff_eq!(smoothed[2], 5.0);
        assert_abs_diff_eq!(smoothed[3], 6.5);
    }

    #[test]
    fn test_centered_mean_window_one_is_identity() {
        let values = [4.0, 8.0, 15.0];
        assert_eq!(centered_mean(&values, 1), values.to_vec());
        assert!(centered_mean(&[], 3).is_empty());
    }
}
