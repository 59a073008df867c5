//! Dwell selection for on-screen elements.
//!
//! An element fires after the gaze has rested on it for the dwell threshold.
//! Timing is driven from outside: a scheduler calls [`DwellSelector::tick`]
//! (or [`DwellBoard::poll`]) with the time elapsed since the last call, so
//! the state machines do not depend on a UI toolkit or a wall clock.
//! [`DwellBoard::run`] is the built-in scheduler, polling once per
//! configured poll interval.

use crate::{
    config::DwellConfig, constants::DEFAULT_DWELL_POLL_MS, eye_metrics::Point2, stop::StopToken, Error,
    Result,
};
use log::{debug, info};
use std::time::Duration;

/// Hover state of one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DwellPhase {
    /// Not hovered
    #[default]
    Idle,
    /// Hovered, progress accumulating
    Hovering,
    /// Fired during the current hover
    Fired,
}

/// Timing of one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellSettings {
    /// Continuous hover needed to fire
    pub threshold: Duration,
    /// Re-fire period after the first selection
    pub repeat_interval: Duration,
    /// Keep firing while the hover persists
    pub repeating: bool,
}

impl DwellSettings {
    /// Same settings with repetition switched on or off
    #[must_use]
    pub const fn with_repeating(mut self, repeating: bool) -> Self {
        self.repeating = repeating;
        self
    }
}

impl From<&DwellConfig> for DwellSettings {
    fn from(config: &DwellConfig) -> Self {
        Self {
            threshold: config.dwell_threshold(),
            repeat_interval: config.repeat_interval(),
            repeating: config.repeating,
        }
    }
}

impl Default for DwellSettings {
    fn default() -> Self {
        Self::from(&DwellConfig::default())
    }
}

/// Hover/progress state machine for a single element
#[derive(Debug, Clone)]
pub struct DwellSelector {
    settings: DwellSettings,
    phase: DwellPhase,
    progress: Duration,
    since_fire: Duration,
}

impl DwellSelector {
    /// Create an idle selector
    #[must_use]
    pub const fn new(settings: DwellSettings) -> Self {
        Self {
            settings,
            phase: DwellPhase::Idle,
            progress: Duration::ZERO,
            since_fire: Duration::ZERO,
        }
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> DwellPhase {
        self.phase
    }

    /// Accumulated hover time towards the next selection
    #[must_use]
    pub const fn progress(&self) -> Duration {
        self.progress
    }

    /// Progress as a fraction of the threshold, for drawing a fill bar
    #[must_use]
    pub fn progress_ratio(&self) -> f64 {
        if self.settings.threshold.is_zero() {
            return 0.0;
        }
        (self.progress.as_secs_f64() / self.settings.threshold.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Begin hovering if the element is available; no-op while already hovered
    pub fn start_dwell(&mut self, available: bool) {
        if !available || self.phase != DwellPhase::Idle {
            return;
        }
        self.phase = DwellPhase::Hovering;
        self.progress = Duration::ZERO;
        self.since_fire = Duration::ZERO;
    }

    /// Advance by `elapsed`; returns how many selections fired
    pub fn tick(&mut self, elapsed: Duration) -> u32 {
        match self.phase {
            DwellPhase::Idle => 0,
            DwellPhase::Hovering => {
                self.progress += elapsed;
                if self.progress < self.settings.threshold {
                    return 0;
                }
                // time past the threshold already counts towards the first repeat
                self.since_fire = self.progress - self.settings.threshold;
                self.phase = DwellPhase::Fired;
                self.progress = Duration::ZERO;
                1 + self.drain_repeats()
            }
            DwellPhase::Fired => {
                self.since_fire += elapsed;
                self.drain_repeats()
            }
        }
    }

    fn drain_repeats(&mut self) -> u32 {
        if !self.settings.repeating || self.settings.repeat_interval.is_zero() {
            self.since_fire = Duration::ZERO;
            return 0;
        }
        let mut fired = 0;
        while self.since_fire >= self.settings.repeat_interval {
            self.since_fire -= self.settings.repeat_interval;
            fired += 1;
        }
        fired
    }

    /// Hover lost: back to idle, progress and repeat timer cleared
    pub fn stop_dwell(&mut self) {
        self.phase = DwellPhase::Idle;
        self.progress = Duration::ZERO;
        self.since_fire = Duration::ZERO;
    }
}

/// Axis-aligned element bounds in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create bounds
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Half-open containment: left/top edges inside, right/bottom outside
    #[must_use]
    pub fn contains(&self, point: Point2) -> bool {
        point.x >= self.x && point.x < self.x + self.width && point.y >= self.y && point.y < self.y + self.height
    }
}

/// Handle to an element registered on a [`DwellBoard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    /// Registration index
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

type Action = Box<dyn FnMut() + Send>;

struct Element {
    bounds: Rect,
    visible: bool,
    enabled: bool,
    selector: DwellSelector,
    action: Option<Action>,
}

/// A set of dwell-selectable elements hit-tested against one gaze point
pub struct DwellBoard {
    defaults: DwellSettings,
    poll_interval: Duration,
    elements: Vec<Element>,
}

impl DwellBoard {
    /// Create an empty board; new elements use `defaults`
    #[must_use]
    pub const fn new(defaults: DwellSettings) -> Self {
        Self {
            defaults,
            poll_interval: Duration::from_millis(DEFAULT_DWELL_POLL_MS),
            elements: Vec::new(),
        }
    }

    /// Board with element timing and poll period taken from configuration
    #[must_use]
    pub fn from_config(config: &DwellConfig) -> Self {
        Self::new(DwellSettings::from(config)).with_poll_interval(config.poll_interval())
    }

    /// Same board polled every `interval` by [`DwellBoard::run`]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Period between polls in [`DwellBoard::run`]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Register a visible, enabled element with the board defaults
    pub fn add(&mut self, bounds: Rect) -> ElementId {
        self.add_with(bounds, self.defaults)
    }

    /// Register an element with its own timing
    pub fn add_with(&mut self, bounds: Rect, settings: DwellSettings) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            bounds,
            visible: true,
            enabled: true,
            selector: DwellSelector::new(settings),
            action: None,
        });
        debug!("Registered dwell element {} at {:?}", id.0, bounds);
        id
    }

    /// Run `action` each time the element fires
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown element
    pub fn bind<F>(&mut self, id: ElementId, action: F) -> Result<()>
    where
        F: FnMut() + Send + 'static,
    {
        self.element_mut(id)?.action = Some(Box::new(action));
        Ok(())
    }

    /// Show or hide an element; hidden elements never fire
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown element
    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> Result<()> {
        self.element_mut(id)?.visible = visible;
        Ok(())
    }

    /// Enable or disable an element; disabled elements never fire
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown element
    pub fn set_enabled(&mut self, id: ElementId, enabled: bool) -> Result<()> {
        self.element_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// Move or resize an element
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown element
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) -> Result<()> {
        self.element_mut(id)?.bounds = bounds;
        Ok(())
    }

    /// Selector state of an element
    #[must_use]
    pub fn selector(&self, id: ElementId) -> Option<&DwellSelector> {
        self.elements.get(id.0).map(|e| &e.selector)
    }

    /// Number of registered elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no elements are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Hit-test every element against `gaze` and advance its timer
    ///
    /// Returns the elements that fired, once per selection, in registration
    /// order. Bound actions run before this returns.
    pub fn poll(&mut self, gaze: Option<Point2>, elapsed: Duration) -> Vec<ElementId> {
        let mut fired = Vec::new();

        for (index, element) in self.elements.iter_mut().enumerate() {
            let available = element.visible && element.enabled;
            let hovered = available && gaze.is_some_and(|g| element.bounds.contains(g));

            if !hovered {
                element.selector.stop_dwell();
                continue;
            }

            element.selector.start_dwell(available);
            let count = element.selector.tick(elapsed);
            for _ in 0..count {
                info!("Dwell selection on element {index}");
                if let Some(action) = element.action.as_mut() {
                    action();
                }
                fired.push(ElementId(index));
            }
        }

        fired
    }

    /// Poll once per poll interval until `stop` is set
    ///
    /// `gaze` is asked for the current gaze point before every poll. Each
    /// poll advances the element timers by exactly one interval, so a slow
    /// caller stretches the dwell rather than skipping ahead. Returns the
    /// number of selections fired.
    pub fn run<F>(&mut self, mut gaze: F, stop: &StopToken) -> usize
    where
        F: FnMut() -> Option<Point2>,
    {
        info!(
            "Dwell board polling {} elements every {:?}",
            self.elements.len(),
            self.poll_interval
        );
        let mut selections = 0;
        while !stop.is_stopped() {
            std::thread::sleep(self.poll_interval);
            let point = gaze();
            selections += self.poll(point, self.poll_interval).len();
        }
        debug!("Dwell board stopped after {selections} selections");
        selections
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.elements
            .get_mut(id.0)
            .ok_or_else(|| Error::InvalidInput(format!("unknown dwell element {}", id.0)))
    }
}
