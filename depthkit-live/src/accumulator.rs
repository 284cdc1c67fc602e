//! Rolling average over fixed windows of frames.

/// Sums per-frame values and reports the average once per window.
///
/// Not a sliding window: the sum and count reset to zero every time a window
/// completes, whether or not its average crossed any threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingAverage {
    window: u32,
    sum: f64,
    count: u32,
}

impl RollingAverage {
    /// `window` is clamped to at least one frame.
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            sum: 0.0,
            count: 0,
        }
    }

    /// Add one value. Returns the window's average when this value completes it.
    pub fn push(&mut self, value: f32) -> Option<f32> {
        self.sum += value as f64;
        self.count += 1;
        if self.count < self.window {
            return None;
        }
        let average = (self.sum / self.count as f64) as f32;
        self.reset();
        Some(average)
    }

    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }
}

/// A rolling average paired with the threshold that fires an alert.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdAlert {
    average: RollingAverage,
    threshold: f32,
}

impl ThresholdAlert {
    pub fn new(window: u32, threshold: f32) -> Self {
        Self {
            average: RollingAverage::new(window),
            threshold,
        }
    }

    /// Feed one frame's value. `Some(average)` means the alert should fire.
    pub fn observe(&mut self, value: f32) -> Option<f32> {
        self.average.push(value).filter(|&avg| avg > self.threshold)
    }

    pub fn accumulator(&self) -> &RollingAverage {
        &self.average
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_of_high_values_fires_once() {
        let mut alert = ThresholdAlert::new(10, 200.0);
        let fired: Vec<f32> = (0..10).filter_map(|_| alert.observe(210.0)).collect();
        assert_eq!(fired, vec![210.0]);
        assert_eq!(alert.accumulator().count(), 0);
        assert_eq!(alert.accumulator().sum(), 0.0);
    }

    #[test]
    fn test_window_of_low_values_does_not_fire() {
        let mut alert = ThresholdAlert::new(10, 200.0);
        assert!((0..10).all(|_| alert.observe(150.0).is_none()));
        assert_eq!(alert.accumulator().count(), 0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut alert = ThresholdAlert::new(2, 200.0);
        assert!(alert.observe(200.0).is_none());
        assert!(alert.observe(200.0).is_none());
    }

    #[test]
    fn test_average_reported_per_window() {
        let mut average = RollingAverage::new(3);
        assert_eq!(average.push(1.0), None);
        assert_eq!(average.push(2.0), None);
        assert_eq!(average.push(6.0), Some(3.0));
        assert_eq!(average.count(), 0);
        assert_eq!(average.push(4.0), None);
        assert_eq!(average.count(), 1);
    }

    #[test]
    fn test_zero_window_behaves_as_one() {
        let mut average = RollingAverage::new(0);
        assert_eq!(average.window(), 1);
        assert_eq!(average.push(7.0), Some(7.0));
    }
}
