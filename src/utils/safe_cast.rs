//! Safe casting between screen-space floats and integer pixel coordinates

use crate::eye_metrics::Point2;

/// Round and clamp f64 to i32 for pixel coordinates
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn f64_to_i32_clamp(value: f64, min: i32, max: i32) -> i32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.round().clamp(f64::from(min), f64::from(max));
    (clamped as i32).clamp(min, max)
}

/// Narrow a pixel coordinate to the i16 range used by the X11 protocol
#[must_use]
pub fn i32_to_i16_clamp(value: i32) -> i16 {
    i16::try_from(value).unwrap_or(if value < 0 { i16::MIN } else { i16::MAX })
}

/// Whole-pixel position of a screen point; `(0, 0)` for non-finite input
#[must_use]
pub fn to_pixel(point: Point2) -> (i32, i32) {
    (
        f64_to_i32_clamp(point.x, 0, i32::MAX),
        f64_to_i32_clamp(point.y, 0, i32::MAX),
    )
}
