//! Per-frame eye geometry: landmark frames, eye aspect ratio and centroids.
//!
//! Everything here is a pure function of the current frame. The external
//! landmark detector hands us six contour points per eye in EAR order
//! (outer corner, two upper lid points, inner corner, two lower lid points).

use crate::{
    constants::{EAR_EPSILON, EYE_POINT_COUNT, LEFT_EYE_INDICES, RIGHT_EYE_INDICES},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A 2D point in frame or screen pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point2 {
    /// Create a point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Contour points of one eye
pub type EyePoints = [Point2; EYE_POINT_COUNT];

/// Both eyes' contour points for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeLandmarks {
    /// Left eye contour
    pub left: EyePoints,
    /// Right eye contour
    pub right: EyePoints,
}

impl EyeLandmarks {
    /// Pick both eye contours out of a full face-mesh point list
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh does not contain the eye indices
    pub fn from_face_mesh(mesh: &[Point2]) -> Result<Self> {
        let pick = |indices: &[usize; EYE_POINT_COUNT]| -> Result<EyePoints> {
            let mut points = [Point2::default(); EYE_POINT_COUNT];
            for (slot, &index) in points.iter_mut().zip(indices) {
                *slot = *mesh.get(index).ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "face mesh has {} points, eye index {index} missing",
                        mesh.len()
                    ))
                })?;
            }
            Ok(points)
        };

        Ok(Self {
            left: pick(&LEFT_EYE_INDICES)?,
            right: pick(&RIGHT_EYE_INDICES)?,
        })
    }

    /// Metrics for both eyes
    #[must_use]
    pub fn metrics(&self) -> (EyeMetrics, EyeMetrics) {
        (EyeMetrics::from_landmarks(&self.left), EyeMetrics::from_landmarks(&self.right))
    }

    /// Combined gaze centroid: mean of all twelve points
    #[must_use]
    pub fn gaze_centroid(&self) -> Point2 {
        gaze_centroid(&self.left, &self.right)
    }
}

/// One frame as delivered by the landmark detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture time in milliseconds since the stream started
    pub timestamp_ms: u64,
    /// Eye contours, absent when no face was detected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyes: Option<EyeLandmarks>,
}

impl LandmarkFrame {
    /// Frame with detected eyes
    #[must_use]
    pub const fn detected(timestamp_ms: u64, eyes: EyeLandmarks) -> Self {
        Self { timestamp_ms, eyes: Some(eyes) }
    }

    /// Frame in which no face was found
    #[must_use]
    pub const fn empty(timestamp_ms: u64) -> Self {
        Self { timestamp_ms, eyes: None }
    }

    /// Capture time as a duration
    #[must_use]
    pub const fn timestamp(&self) -> Duration {
        Duration::from_millis(self.timestamp_ms)
    }
}

/// Derived per-eye values for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeMetrics {
    /// Eye aspect ratio; drops towards zero as the lid closes
    pub aspect_ratio: f64,
    /// Mean contour position
    pub centroid: Point2,
}

impl EyeMetrics {
    /// Compute metrics from six contour points
    #[must_use]
    pub fn from_landmarks(points: &EyePoints) -> Self {
        Self {
            aspect_ratio: eye_aspect_ratio(points),
            centroid: centroid(points.iter()),
        }
    }
}

/// Eye aspect ratio: mean vertical lid opening over horizontal eye width
#[must_use]
pub fn eye_aspect_ratio(points: &EyePoints) -> f64 {
    let a = points[1].distance(&points[5]);
    let b = points[2].distance(&points[4]);
    let c = points[0].distance(&points[3]) + EAR_EPSILON;
    (a + b) / (2.0 * c)
}

/// Combined gaze point of both eyes
#[must_use]
pub fn gaze_centroid(left: &EyePoints, right: &EyePoints) -> Point2 {
    centroid(left.iter().chain(right.iter()))
}

/// Arithmetic mean of a set of points; the origin for an empty set
pub fn centroid<'a, I>(points: I) -> Point2
where
    I: IntoIterator<Item = &'a Point2>,
{
    let (sum, count) = points
        .into_iter()
        .fold((Point2::default(), 0usize), |(acc, n), p| {
            (Point2::new(acc.x + p.x, acc.y + p.y), n + 1)
        });

    if count == 0 {
        return Point2::default();
    }

    #[allow(clippy::cast_precision_loss)]
    let n = count as f64;
    Point2::new(sum.x / n, sum.y / n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_eye(cx: f64, cy: f64) -> EyePoints {
        [
            Point2::new(cx - 10.0, cy),
            Point2::new(cx - 4.0, cy - 3.0),
            Point2::new(cx + 4.0, cy - 3.0),
            Point2::new(cx + 10.0, cy),
            Point2::new(cx + 4.0, cy + 3.0),
            Point2::new(cx - 4.0, cy + 3.0),
        ]
    }

    #[test]
    fn test_ear_of_open_eye() {
        let ear = eye_aspect_ratio(&open_eye(100.0, 100.0));
        // (6 + 6) / (2 * 20)
        assert!((ear - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_ear_of_degenerate_eye_is_finite() {
        let points = [Point2::new(5.0, 5.0); EYE_POINT_COUNT];
        let ear = eye_aspect_ratio(&points);
        assert!(ear.is_finite());
        assert_eq!(ear, 0.0);
    }

    #[test]
    fn test_centroid() {
        let c = centroid(open_eye(40.0, 60.0).iter());
        assert!((c.x - 40.0).abs() < 1e-9);
        assert!((c.y - 60.0).abs() < 1e-9);
        assert_eq!(centroid(std::iter::empty()), Point2::default());
    }

    #[test]
    fn test_gaze_centroid_is_mean_of_both_eyes() {
        let eyes = EyeLandmarks {
            left: open_eye(100.0, 50.0),
            right: open_eye(200.0, 70.0),
        };
        let gaze = eyes.gaze_centroid();
        assert!((gaze.x - 150.0).abs() < 1e-9);
        assert!((gaze.y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_face_mesh() {
        let mesh: Vec<Point2> = (0..478).map(|i| Point2::new(f64::from(i), 0.0)).collect();
        let eyes = EyeLandmarks::from_face_mesh(&mesh).unwrap();
        assert_eq!(eyes.left[0].x, 33.0);
        assert_eq!(eyes.right[5].x, 373.0);

        assert!(EyeLandmarks::from_face_mesh(&mesh[..100]).is_err());
    }

    #[test]
    fn test_frame_json_without_eyes() {
        let frame: LandmarkFrame = serde_json::from_str(r#"{"timestamp_ms": 40}"#).unwrap();
        assert_eq!(frame, LandmarkFrame::empty(40));
        assert_eq!(frame.timestamp(), Duration::from_millis(40));
    }
}
