//! Calibration: guided sample collection, least-squares fit and model persistence.
//!
//! A session shows the user a grid of screen targets, records the gaze
//! centroid while they look at each one, and fits a linear map from gaze
//! centroid to screen point.

/// Guided sample collection over a target grid
pub mod trainer;

/// Fitted gaze → screen model with YAML persistence
pub mod model;

/// CSV persistence of calibration samples
pub mod dataset;

pub use model::{AxisCoefficients, CalibrationModel, FitReport};
pub use trainer::{target_grid, CalibrationSession};

use crate::eye_metrics::Point2;
use serde::{Deserialize, Serialize};

/// One recorded pairing of gaze centroid and the target the user was looking at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    /// Combined eye centroid in frame pixels
    pub gaze_centroid: Point2,
    /// Target position in screen pixels
    pub target_screen_point: Point2,
}

impl CalibrationSample {
    /// Create a sample
    #[must_use]
    pub const fn new(gaze_centroid: Point2, target_screen_point: Point2) -> Self {
        Self {
            gaze_centroid,
            target_screen_point,
        }
    }
}
