use super::GazeFilter;
use crate::eye_metrics::Point2;

/// Exponential smoothing filter
pub struct ExponentialFilter {
    alpha: f64,
    last: Option<Point2>,
}

impl ExponentialFilter {
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in (0, 1]");
        Self { alpha, last: None }
    }
}

impl GazeFilter for ExponentialFilter {
    fn apply(&mut self, point: Point2) -> Point2 {
        let filtered = match self.last {
            Some(last) => Point2::new(
                self.alpha * point.x + (1.0 - self.alpha) * last.x,
                self.alpha * point.y + (1.0 - self.alpha) * last.y,
            ),
            None => point,
        };

        self.last = Some(filtered);
        filtered
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}
