use super::GazeFilter;
use crate::eye_metrics::Point2;
use std::collections::VecDeque;

/// Per-axis median filter; rejects single-frame landmark glitches
pub struct MedianFilter {
    window_size: usize,
    buffer: VecDeque<Point2>,
}

impl MedianFilter {
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "Window size must be greater than 0");
        assert!(window_size % 2 == 1, "Median filter window size must be odd");
        Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size),
        }
    }

    fn median(mut values: Vec<f64>) -> f64 {
        values.sort_by(f64::total_cmp);

        let len = values.len();
        if len == 0 {
            0.0
        } else if len % 2 == 0 {
            (values[len / 2 - 1] + values[len / 2]) / 2.0
        } else {
            values[len / 2]
        }
    }
}

impl GazeFilter for MedianFilter {
    fn apply(&mut self, point: Point2) -> Point2 {
        if self.buffer.len() >= self.window_size {
            self.buffer.pop_front();
        }
        self.buffer.push_back(point);

        Point2::new(
            Self::median(self.buffer.iter().map(|p| p.x).collect()),
            Self::median(self.buffer.iter().map(|p| p.y).collect()),
        )
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn name(&self) -> &str {
        "MedianFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_rejects_spike() {
        let mut filter = MedianFilter::new(3);
        filter.apply(Point2::new(1.0, 1.0));
        filter.apply(Point2::new(500.0, 5.0));
        assert_eq!(filter.apply(Point2::new(3.0, 3.0)), Point2::new(3.0, 3.0));
        assert_eq!(filter.apply(Point2::new(7.0, 7.0)), Point2::new(7.0, 5.0));
    }

    #[test]
    fn test_partial_window_averages_middle_pair() {
        let mut filter = MedianFilter::new(5);
        filter.apply(Point2::new(2.0, 2.0));
        assert_eq!(filter.apply(Point2::new(4.0, 8.0)), Point2::new(3.0, 5.0));
    }

    #[test]
    #[should_panic(expected = "Median filter window size must be odd")]
    fn test_even_window() {
        let _ = MedianFilter::new(4);
    }
}
