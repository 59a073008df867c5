//! Double-blink click detection.
//!
//! Each eye runs its own open/closed state machine. A click needs two
//! closed→open transitions of the same eye inside the double-blink window;
//! a transition after the window starts a fresh count of one.

use crate::config::BlinkConfig;
use log::{debug, info, warn};
use std::fmt;
use std::time::Duration;

/// Which eye a detector watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    /// Left eye; double blink sends a left click
    Left,
    /// Right eye; double blink sends a right click
    Right,
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// Mouse button a click event presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button
    Left,
    /// Secondary button
    Right,
}

impl From<Eye> for MouseButton {
    fn from(eye: Eye) -> Self {
        match eye {
            Eye::Left => Self::Left,
            Eye::Right => Self::Right,
        }
    }
}

/// A click recognised from a double blink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// Button to press
    pub button: MouseButton,
    /// Frame timestamp of the second reopening
    pub timestamp: Duration,
}

/// Lid state of one eye
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlinkPhase {
    /// EAR at or above the threshold
    #[default]
    Open,
    /// EAR below the threshold
    Closed,
}

/// Per-eye blink bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlinkState {
    /// Current lid state
    pub phase: BlinkPhase,
    /// Reopenings counted towards the current double blink
    pub blink_count: u32,
    /// Last closed→open transition, `None` if never
    pub last_blink_timestamp: Option<Duration>,
    /// Last emitted click, `None` if never
    pub last_click_timestamp: Option<Duration>,
}

/// Open/closed state machine for one eye
#[derive(Debug, Clone)]
pub struct BlinkDetector {
    eye: Eye,
    threshold: f64,
    double_blink_window: Duration,
    click_cooldown: Duration,
    clicks_enabled: bool,
    state: BlinkState,
}

impl BlinkDetector {
    /// Create a detector for `eye`; the right eye honours `enable_right_click`
    #[must_use]
    pub fn new(eye: Eye, config: &BlinkConfig) -> Self {
        Self {
            eye,
            threshold: config.ear_click_threshold,
            double_blink_window: config.double_blink_window(),
            click_cooldown: config.click_cooldown(),
            clicks_enabled: match eye {
                Eye::Left => true,
                Eye::Right => config.enable_right_click,
            },
            state: BlinkState::default(),
        }
    }

    /// Eye this detector watches
    #[must_use]
    pub const fn eye(&self) -> Eye {
        self.eye
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &BlinkState {
        &self.state
    }

    /// Whether the eye is currently closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.phase == BlinkPhase::Closed
    }

    /// Whether the eye reopened less than `window` before `now`
    #[must_use]
    pub fn reopened_within(&self, now: Duration, window: Duration) -> bool {
        self.state
            .last_blink_timestamp
            .is_some_and(|t| now.saturating_sub(t) < window)
    }

    /// Feed one frame's EAR; returns a click when a double blink completes
    pub fn update(&mut self, ear: f64, now: Duration) -> Option<ClickEvent> {
        match self.state.phase {
            BlinkPhase::Open => {
                if ear < self.threshold {
                    self.state.phase = BlinkPhase::Closed;
                }
                None
            }
            BlinkPhase::Closed if ear >= self.threshold => {
                self.state.phase = BlinkPhase::Open;
                self.on_reopen(now)
            }
            BlinkPhase::Closed => None,
        }
    }

    fn on_reopen(&mut self, now: Duration) -> Option<ClickEvent> {
        let within_window = self
            .state
            .last_blink_timestamp
            .is_some_and(|t| now.saturating_sub(t) <= self.double_blink_window);

        self.state.blink_count = if within_window { self.state.blink_count + 1 } else { 1 };
        self.state.last_blink_timestamp = Some(now);
        debug!("{} eye blink #{} at {:?}", self.eye, self.state.blink_count, now);

        let cooled_down = self
            .state
            .last_click_timestamp
            .map_or(true, |t| now.saturating_sub(t) > self.click_cooldown);

        if self.state.blink_count >= 2 && self.clicks_enabled && cooled_down {
            self.state.blink_count = 0;
            self.state.last_click_timestamp = Some(now);
            let event = ClickEvent {
                button: self.eye.into(),
                timestamp: now,
            };
            info!("Double blink on {} eye: {:?} click", self.eye, event.button);
            return Some(event);
        }

        None
    }
}

/// Both eyes' detectors, updated together each frame
#[derive(Debug, Clone)]
pub struct BlinkPair {
    /// Left eye detector
    pub left: BlinkDetector,
    /// Right eye detector
    pub right: BlinkDetector,
}

impl BlinkPair {
    /// Create detectors for both eyes
    #[must_use]
    pub fn new(config: &BlinkConfig) -> Self {
        if config.enable_double_click {
            warn!("enable_double_click is set but two-eye double click is not supported; ignoring");
        }
        Self {
            left: BlinkDetector::new(Eye::Left, config),
            right: BlinkDetector::new(Eye::Right, config),
        }
    }

    /// Feed both eyes' EAR; at most one click per eye
    pub fn update(&mut self, left_ear: f64, right_ear: f64, now: Duration) -> Vec<ClickEvent> {
        [self.left.update(left_ear, now), self.right.update(right_ear, now)]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Either eye currently closed
    #[must_use]
    pub fn any_closed(&self) -> bool {
        self.left.is_closed() || self.right.is_closed()
    }

    /// Either eye reopened less than `window` before `now`
    #[must_use]
    pub fn reopened_within(&self, now: Duration, window: Duration) -> bool {
        self.left.reopened_within(now, window) || self.right.reopened_within(now, window)
    }
}
