// ----------------------
// 心率滑动窗口
// ----------------------

/// Sliding-window smoother with endpoint trend detection.
///
/// The window is a plain shift register: once full, every new value
/// drops the oldest one from the front.
#[derive(Debug, Clone)]
pub struct HeartRateProcessor {
    window: Vec<i32>,
    capacity: usize,
    threshold: i32,
}

impl HeartRateProcessor {
    /// `width` below 1 is clamped to 1.
    pub fn new(width: usize, threshold: i32) -> HeartRateProcessor {
        let capacity = width.max(1);
        HeartRateProcessor {
            window: Vec::new(),
            capacity,
            threshold,
        }
    }

    /// Pushes a raw value and returns the smoothed value after the update.
    pub fn add_value(&mut self, raw: i32) -> i32 {
        if self.window.len() == self.capacity {
            self.window.remove(0);
        }
        self.window.push(raw);
        self.smoothed_value()
    }

    /// Mean of the window rounded half-up, 0 when empty.
    pub fn smoothed_value(&self) -> i32 {
        if self.window.is_empty() {
            return 0;
        }
        let n = self.window.len() as i64;
        let sum: i64 = self.window.iter().map(|&v| v as i64).sum();
        // floor(sum / n + 0.5)，全部用整数算，避免浮点误差
        (2 * sum + n).div_euclid(2 * n) as i32
    }

    pub fn has_rapid_growth(&self) -> bool {
        match self.endpoints() {
            Some((head, tail)) => tail as i64 - head as i64 > self.threshold as i64,
            None => false,
        }
    }

    pub fn has_decrease(&self) -> bool {
        match self.endpoints() {
            Some((head, tail)) => head as i64 - tail as i64 > self.threshold as i64,
            None => false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn window(&self) -> &[i32] {
        &self.window
    }

    // 窗口未满时不做趋势判断
    fn endpoints(&self) -> Option<(i32, i32)> {
        if !self.is_full() {
            return None;
        }
        Some((self.window[0], self.window[self.capacity - 1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window_smooths_to_zero() {
        let p = HeartRateProcessor::new(4, 5);
        assert_eq!(p.smoothed_value(), 0);
        assert!(p.is_empty());
    }

    #[test]
    fn test_single_value_is_its_own_mean() {
        let mut p = HeartRateProcessor::new(4, 5);
        assert_eq!(p.add_value(72), 72);
        assert_eq!(p.smoothed_value(), 72);
    }

    #[test]
    fn test_zero_width_clamped_to_one() {
        let mut p = HeartRateProcessor::new(0, 5);
        assert_eq!(p.capacity(), 1);
        p.add_value(60);
        p.add_value(90);
        assert_eq!(p.window(), &[90]);
        assert_eq!(p.smoothed_value(), 90);
    }

    #[test]
    fn test_huge_width_does_not_preallocate() {
        let mut p = HeartRateProcessor::new(usize::MAX, 5);
        assert_eq!(p.add_value(70), 70);
        assert!(!p.is_full());
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        let width = 5;
        let mut p = HeartRateProcessor::new(width, 5);
        for i in 0..(width as i32 + 17) {
            p.add_value(60 + i);
            assert!(p.len() <= width);
            if i as usize + 1 >= width {
                let expected: Vec<i32> = ((i + 1 - width as i32)..=i).map(|v| 60 + v).collect();
                assert_eq!(p.window(), expected.as_slice());
            }
        }
    }

    #[test]
    fn test_rounding_half_up() {
        // 2.5 -> 3
        let mut p = HeartRateProcessor::new(2, 5);
        p.add_value(2);
        assert_eq!(p.add_value(3), 3);

        // 2.4 -> 2
        let mut p = HeartRateProcessor::new(5, 5);
        for v in [2, 2, 2, 3, 3] {
            p.add_value(v);
        }
        assert_eq!(p.smoothed_value(), 2);
    }

    #[test]
    fn test_smoothed_value_is_idempotent() {
        let mut p = HeartRateProcessor::new(3, 5);
        p.add_value(61);
        p.add_value(64);
        let first = p.smoothed_value();
        assert_eq!(p.smoothed_value(), first);
        assert_eq!(first, 63);
    }

    #[test]
    fn test_no_trend_while_filling() {
        let mut p = HeartRateProcessor::new(4, 1);
        for v in [40, 200, 10] {
            p.add_value(v);
            assert!(!p.has_rapid_growth());
            assert!(!p.has_decrease());
        }
    }

    #[test]
    fn test_rapid_growth_after_eviction() {
        let mut p = HeartRateProcessor::new(3, 5);
        for v in [60, 60, 60, 70] {
            p.add_value(v);
        }
        assert_eq!(p.window(), &[60, 60, 70]);
        assert!(p.has_rapid_growth());
        assert!(!p.has_decrease());
    }

    #[test]
    fn test_growth_equal_to_threshold_does_not_trigger() {
        let mut p = HeartRateProcessor::new(2, 5);
        p.add_value(60);
        p.add_value(65);
        assert!(!p.has_rapid_growth());
        p.add_value(71);
        assert!(p.has_rapid_growth());
    }

    #[test]
    fn test_decrease() {
        let mut p = HeartRateProcessor::new(3, 5);
        for v in [90, 85, 80] {
            p.add_value(v);
        }
        assert!(p.has_decrease());
        assert!(!p.has_rapid_growth());
    }

    #[test]
    fn test_negative_values_accepted() {
        let mut p = HeartRateProcessor::new(2, 5);
        p.add_value(-3);
        // -1.5 -> floor(-1.0) = -1
        assert_eq!(p.add_value(0), -1);
    }
}
