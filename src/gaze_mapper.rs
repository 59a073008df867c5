//! Gaze centroid → raw screen target.

use crate::{calibration::CalibrationModel, eye_metrics::Point2};
use serde::{Deserialize, Serialize};

/// Display size in pixels; valid positions are `[0, width) × [0, height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ScreenBounds {
    /// Create bounds
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamp a point onto the last valid pixel on each axis
    #[must_use]
    pub fn clamp(&self, point: Point2) -> Point2 {
        let max_x = f64::from(self.width.saturating_sub(1));
        let max_y = f64::from(self.height.saturating_sub(1));
        Point2::new(clamp_axis(point.x, max_x), clamp_axis(point.y, max_y))
    }

    /// Whether a point lies inside the screen
    #[must_use]
    pub fn contains(&self, point: Point2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x < f64::from(self.width) && point.y < f64::from(self.height)
    }
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

/// Applies a loaded calibration model every frame
#[derive(Debug, Clone, Copy)]
pub struct GazeMapper {
    model: CalibrationModel,
    screen: ScreenBounds,
}

impl GazeMapper {
    /// Create a mapper for the given display
    #[must_use]
    pub const fn new(model: CalibrationModel, screen: ScreenBounds) -> Self {
        Self { model, screen }
    }

    /// Raw target for this frame's centroid, clamped to the screen
    #[must_use]
    pub fn map(&self, centroid: Point2) -> Point2 {
        self.screen.clamp(self.model.predict(centroid))
    }

    /// Display this mapper clamps to
    #[must_use]
    pub const fn screen(&self) -> ScreenBounds {
        self.screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::AxisCoefficients;

    fn doubling_model() -> CalibrationModel {
        CalibrationModel {
            x: AxisCoefficients { eye_x: 2.0, eye_y: 0.0, intercept: 0.0 },
            y: AxisCoefficients { eye_x: 0.0, eye_y: 2.0, intercept: 0.0 },
        }
    }

    #[test]
    fn test_map_inside_screen() {
        let mapper = GazeMapper::new(doubling_model(), ScreenBounds::new(800, 600));
        assert_eq!(mapper.map(Point2::new(100.0, 50.0)), Point2::new(200.0, 100.0));
    }

    #[test]
    fn test_map_clamps_out_of_range() {
        let mapper = GazeMapper::new(doubling_model(), ScreenBounds::new(800, 600));
        assert_eq!(mapper.map(Point2::new(1000.0, -40.0)), Point2::new(799.0, 0.0));
        assert_eq!(mapper.map(Point2::new(f64::NAN, 10.0)), Point2::new(0.0, 20.0));
    }

    #[test]
    fn test_screen_contains() {
        let screen = ScreenBounds::new(800, 600);
        assert!(screen.contains(Point2::new(799.9, 0.0)));
        assert!(!screen.contains(Point2::new(800.0, 10.0)));
        assert!(!screen.contains(Point2::new(-0.1, 10.0)));
    }
}
