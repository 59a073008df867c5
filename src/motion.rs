//! Cursor stabilisation.
//!
//! Turns the per-frame raw screen target into a cursor position that does not
//! jump when the user blinks and does not jitter when the gaze rests. Each
//! frame goes through, in order: hold rule, sensitivity gain, deadzone,
//! max-step clamp, adaptive smoothing, screen clamp.

use crate::{config::MotionConfig, eye_metrics::Point2, gaze_mapper::ScreenBounds};
use log::debug;
use std::time::Duration;

/// The single cursor state owned by the stabilizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorState {
    /// Current cursor position
    pub position: Point2,
    /// Position before the last update
    pub previous_position: Point2,
    /// When the cursor last actually moved
    pub last_motion_timestamp: Option<Duration>,
}

/// Everything the stabilizer needs to know about one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionInput {
    /// Mapped screen target, absent when no face was detected
    pub raw_target: Option<Point2>,
    /// Left eye is currently closed
    pub left_closed: bool,
    /// Right eye is currently closed
    pub right_closed: bool,
    /// Either eye reopened within the post-blink hold window
    pub recently_reopened: bool,
    /// Frame timestamp
    pub timestamp: Duration,
}

impl MotionInput {
    /// Input for a frame with open eyes
    #[must_use]
    pub const fn target(raw_target: Point2, timestamp: Duration) -> Self {
        Self {
            raw_target: Some(raw_target),
            left_closed: false,
            right_closed: false,
            recently_reopened: false,
            timestamp,
        }
    }

    fn blinking(&self) -> bool {
        self.left_closed || self.right_closed || self.recently_reopened
    }
}

/// Why a frame left the cursor where it was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    /// No landmarks this frame
    NoTarget,
    /// An eye is closed or just reopened
    Blink,
}

/// Smoothed, bounded cursor driven by raw gaze targets
#[derive(Debug, Clone)]
pub struct MotionStabilizer {
    config: MotionConfig,
    screen: ScreenBounds,
    state: Option<CursorState>,
}

impl MotionStabilizer {
    /// Create a stabilizer for the given display
    #[must_use]
    pub const fn new(config: MotionConfig, screen: ScreenBounds) -> Self {
        Self {
            config,
            screen,
            state: None,
        }
    }

    /// Cursor state, `None` until the first target arrives
    #[must_use]
    pub const fn state(&self) -> Option<&CursorState> {
        self.state.as_ref()
    }

    /// Current cursor position
    #[must_use]
    pub fn position(&self) -> Option<Point2> {
        self.state.map(|s| s.position)
    }

    /// Forget the cursor; the next target re-initialises it
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Advance one frame and return the cursor position
    pub fn update(&mut self, input: &MotionInput) -> Option<Point2> {
        let Some(target) = input.raw_target else {
            self.hold(HoldReason::NoTarget);
            return self.position();
        };
        let target = self.screen.clamp(target);

        if self.state.is_none() {
            debug!("Cursor initialised at ({:.0}, {:.0})", target.x, target.y);
            self.state = Some(CursorState {
                position: target,
                previous_position: target,
                last_motion_timestamp: Some(input.timestamp),
            });
            return Some(target);
        }
        let Some(state) = self.state.as_mut() else {
            return None;
        };

        if self.config.hold_on_blink && input.blinking() {
            state.previous_position = state.position;
            self.hold(HoldReason::Blink);
            return self.position();
        }

        let previous = state.position;
        let next = self.screen.clamp(step_towards(&self.config, previous, target));

        state.previous_position = previous;
        state.position = next;
        if next != previous {
            state.last_motion_timestamp = Some(input.timestamp);
        }

        Some(next)
    }

    fn hold(&self, reason: HoldReason) {
        if let Some(state) = &self.state {
            debug!(
                "Cursor held at ({:.0}, {:.0}): {:?}",
                state.position.x, state.position.y, reason
            );
        }
    }
}

/// One stabilised step from `previous` towards `target`, without the screen clamp
#[must_use]
pub fn step_towards(config: &MotionConfig, previous: Point2, target: Point2) -> Point2 {
    let shape = |distance: f64| {
        let scaled = distance * config.sensitivity_gain;
        if scaled.abs() < config.deadzone_px {
            0.0
        } else {
            scaled.clamp(-config.max_step_px, config.max_step_px)
        }
    };

    let dx = shape(target.x - previous.x);
    let dy = shape(target.y - previous.y);

    let alpha = if previous.distance(&target) > config.far_threshold_px {
        config.alpha_far
    } else {
        config.smoothing
    };

    Point2::new(
        previous.x * (1.0 - alpha) + (previous.x + dx) * alpha,
        previous.y * (1.0 - alpha) + (previous.y + dy) * alpha,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stabilizer() -> MotionStabilizer {
        MotionStabilizer::new(MotionConfig::default(), ScreenBounds::new(1920, 1080))
    }

    fn at(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_first_target_initialises_cursor() {
        let mut s = stabilizer();
        assert_eq!(s.position(), None);
        let p = s.update(&MotionInput::target(Point2::new(500.0, 400.0), at(0)));
        assert_eq!(p, Some(Point2::new(500.0, 400.0)));
    }

    #[test]
    fn test_near_step_uses_base_smoothing() {
        let mut s = stabilizer();
        s.update(&MotionInput::target(Point2::new(500.0, 500.0), at(0)));
        // dx = 50 * 1.6 = 80, clamped to 35; distance 50 is near so alpha = 0.22
        let p = s.update(&MotionInput::target(Point2::new(550.0, 500.0), at(33))).unwrap();
        assert!((p.x - (500.0 + 35.0 * 0.22)).abs() < 1e-9);
        assert_eq!(p.y, 500.0);
    }

    #[test]
    fn test_far_step_uses_far_alpha() {
        let mut s = stabilizer();
        s.update(&MotionInput::target(Point2::new(500.0, 500.0), at(0)));
        let p = s.update(&MotionInput::target(Point2::new(900.0, 500.0), at(33))).unwrap();
        assert!((p.x - (500.0 + 35.0 * 0.35)).abs() < 1e-9);
    }

    #[test]
    fn test_deadzone_ignores_small_offsets() {
        let mut s = stabilizer();
        s.update(&MotionInput::target(Point2::new(500.0, 500.0), at(0)));
        // 2 px * 1.6 = 3.2 < 4
        let p = s.update(&MotionInput::target(Point2::new(502.0, 498.0), at(33)));
        assert_eq!(p, Some(Point2::new(500.0, 500.0)));
        assert_eq!(s.state().unwrap().last_motion_timestamp, Some(at(0)));
    }

    #[test]
    fn test_hold_while_eye_closed_or_reopening() {
        let mut s = stabilizer();
        s.update(&MotionInput::target(Point2::new(500.0, 500.0), at(0)));

        let mut input = MotionInput::target(Point2::new(900.0, 900.0), at(33));
        input.left_closed = true;
        assert_eq!(s.update(&input), Some(Point2::new(500.0, 500.0)));

        input.left_closed = false;
        input.recently_reopened = true;
        assert_eq!(s.update(&input), Some(Point2::new(500.0, 500.0)));
    }

    #[test]
    fn test_no_hold_when_disabled() {
        let config = MotionConfig {
            hold_on_blink: false,
            ..MotionConfig::default()
        };
        let mut s = MotionStabilizer::new(config, ScreenBounds::new(1920, 1080));
        s.update(&MotionInput::target(Point2::new(500.0, 500.0), at(0)));

        let mut input = MotionInput::target(Point2::new(900.0, 500.0), at(33));
        input.right_closed = true;
        assert_ne!(s.update(&input), Some(Point2::new(500.0, 500.0)));
    }

    #[test]
    fn test_missing_target_holds() {
        let mut s = stabilizer();
        assert_eq!(s.update(&MotionInput::default()), None);
        s.update(&MotionInput::target(Point2::new(10.0, 10.0), at(0)));
        assert_eq!(s.update(&MotionInput::default()), Some(Point2::new(10.0, 10.0)));
    }

    #[test]
    fn test_result_stays_on_screen() {
        let config = MotionConfig {
            sensitivity_gain: 50.0,
            max_step_px: 10_000.0,
            smoothing: 1.0,
            alpha_far: 1.0,
            ..MotionConfig::default()
        };
        let mut s = MotionStabilizer::new(config, ScreenBounds::new(800, 600));
        s.update(&MotionInput::target(Point2::new(700.0, 500.0), at(0)));
        let p = s.update(&MotionInput::target(Point2::new(799.0, 599.0), at(33))).unwrap();
        assert_eq!(p, Point2::new(799.0, 599.0));
    }
}
