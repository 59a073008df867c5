use super::GazeFilter;
use crate::eye_metrics::{centroid, Point2};
use std::collections::VecDeque;

/// Moving average filter
pub struct MovingAverageFilter {
    window_size: usize,
    buffer: VecDeque<Point2>,
}

impl MovingAverageFilter {
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "Window size must be greater than 0");
        Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size),
        }
    }
}

impl GazeFilter for MovingAverageFilter {
    fn apply(&mut self, point: Point2) -> Point2 {
        if self.buffer.len() >= self.window_size {
            self.buffer.pop_front();
        }
        self.buffer.push_back(point);

        centroid(self.buffer.iter())
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn name(&self) -> &str {
        "MovingAverageFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average() {
        let mut filter = MovingAverageFilter::new(3);

        assert_eq!(filter.apply(Point2::new(10.0, 20.0)), Point2::new(10.0, 20.0));
        assert_eq!(filter.apply(Point2::new(20.0, 30.0)), Point2::new(15.0, 25.0));
        assert_eq!(filter.apply(Point2::new(30.0, 40.0)), Point2::new(20.0, 30.0));

        // Window is full, oldest value should be dropped
        assert_eq!(filter.apply(Point2::new(40.0, 50.0)), Point2::new(30.0, 40.0));
    }
}
