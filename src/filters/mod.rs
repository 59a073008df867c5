//! Smoothing filters for the raw gaze centroid.
//!
//! These run before the calibration model, on frame-pixel coordinates. The
//! motion stabilizer does its own smoothing on the screen side; a pre-filter
//! is only useful when the landmark detector itself is noisy.

/// Exponential filter for responsive smoothing
pub mod exponential;

/// Moving average filter for simple smoothing
pub mod moving_average;

/// Median filter for outlier rejection
pub mod median;

use crate::{eye_metrics::Point2, Error, Result};
use crate::constants::{DEFAULT_EXPONENTIAL_ALPHA, DEFAULT_MEDIAN_WINDOW, DEFAULT_MOVING_AVERAGE_WINDOW};

/// Trait for all gaze filters
pub trait GazeFilter: Send + Sync {
    /// Apply filter to the next centroid
    fn apply(&mut self, point: Point2) -> Point2;

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl GazeFilter for NoFilter {
    fn apply(&mut self, point: Point2) -> Point2 {
        point
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Create a gaze filter from a type name such as `exponential:0.3` or `median:5`
///
/// # Errors
///
/// Returns `FilterError` for an unknown name or an invalid parameter
pub fn create_filter(filter_type: &str) -> Result<Box<dyn GazeFilter>> {
    let filter_type = filter_type.trim().to_lowercase();
    let (name, param) = match filter_type.split_once(':') {
        Some((name, param)) => (name, Some(param)),
        None => (filter_type.as_str(), None),
    };

    match name {
        "none" | "nofilter" => Ok(Box::new(NoFilter)),
        "exponential" => {
            let alpha = parse_param(param, DEFAULT_EXPONENTIAL_ALPHA)?;
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(Error::FilterError(format!("Alpha must be in (0, 1], got {alpha}")));
            }
            Ok(Box::new(exponential::ExponentialFilter::new(alpha)))
        }
        "moving_average" | "movingaverage" => {
            let window = parse_param(param, DEFAULT_MOVING_AVERAGE_WINDOW)?;
            if window == 0 {
                return Err(Error::FilterError("Window size must be greater than 0".to_string()));
            }
            Ok(Box::new(moving_average::MovingAverageFilter::new(window)))
        }
        "median" => {
            let window = parse_param(param, DEFAULT_MEDIAN_WINDOW)?;
            if window == 0 || window % 2 == 0 {
                return Err(Error::FilterError(format!(
                    "Window size must be odd and greater than 0, got {window}"
                )));
            }
            Ok(Box::new(median::MedianFilter::new(window)))
        }
        _ => Err(Error::FilterError(format!("Unknown filter type: {filter_type}"))),
    }
}

fn parse_param<T: std::str::FromStr>(param: Option<&str>, default: T) -> Result<T> {
    match param {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::FilterError(format!("Invalid filter parameter: {raw}"))),
    }
}
