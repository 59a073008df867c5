//! Configuration management for the eye mouse application

use crate::{
    constants::{
        DEFAULT_ALPHA_FAR, DEFAULT_CALIBRATION_GRID, DEFAULT_CLICK_COOLDOWN_MS, DEFAULT_DEADZONE_PX,
        DEFAULT_DOUBLE_BLINK_WINDOW_MS, DEFAULT_DWELL_MS, DEFAULT_DWELL_POLL_MS, DEFAULT_EAR_CLICK_THRESHOLD,
        DEFAULT_FAR_THRESHOLD_PX, DEFAULT_HOLD_EXTRA_MS, DEFAULT_MAX_STEP_PX, DEFAULT_REPEAT_INTERVAL_MS,
        DEFAULT_SAMPLES_PER_TARGET, DEFAULT_SENSITIVITY_GAIN, DEFAULT_SETTLE_DELAY_MS, DEFAULT_SMOOTHING,
    },
    filters::GazeFilter,
    gaze_mapper::ScreenBounds,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display size override
    pub screen: ScreenConfig,

    /// Cursor stabilisation
    pub motion: MotionConfig,

    /// Blink click detection
    pub blink: BlinkConfig,

    /// Dwell selection defaults
    pub dwell: DwellConfig,

    /// Calibration session and file locations
    pub calibration: CalibrationConfig,

    /// Optional smoothing of the gaze centroid before mapping
    pub gaze_filter: FilterConfig,
}

/// Display size override; unset fields are read from the display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Screen width in pixels
    pub width: Option<u32>,

    /// Screen height in pixels
    pub height: Option<u32>,
}

/// Cursor stabilisation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Base smoothing factor (0.0-1.0]
    pub smoothing: f64,

    /// Freeze the cursor while an eye is closed
    pub hold_on_blink: bool,

    /// Keep holding this long after an eye reopens (milliseconds)
    pub hold_extra_ms: u64,

    /// Per-axis movement below this is ignored (pixels)
    pub deadzone_px: f64,

    /// Largest per-axis step per frame (pixels)
    pub max_step_px: f64,

    /// Multiplier on the distance to the target
    pub sensitivity_gain: f64,

    /// Distance beyond which `alpha_far` is used (pixels)
    pub far_threshold_px: f64,

    /// Smoothing factor for far targets (0.0-1.0]
    pub alpha_far: f64,
}

/// Blink click parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// EAR below this counts as closed
    pub ear_click_threshold: f64,

    /// Minimum time between clicks of one eye (milliseconds)
    pub click_cooldown_ms: u64,

    /// Maximum gap between the two blinks of a double blink (milliseconds)
    pub double_blink_window_ms: u64,

    /// Right-eye double blink sends a right click
    pub enable_right_click: bool,

    /// Reserved: two-eye double blink as a double click (not implemented)
    pub enable_double_click: bool,
}

/// Dwell selection defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DwellConfig {
    /// Continuous hover needed to select (milliseconds)
    pub dwell_ms: u64,

    /// Re-fire period of repeating elements (milliseconds)
    pub repeat_interval_ms: u64,

    /// Whether elements repeat by default
    pub repeating: bool,

    /// Period at which `DwellBoard::run` polls the board (milliseconds)
    pub poll_interval_ms: u64,
}

/// Calibration session parameters and file locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Valid samples recorded per target
    pub samples_per_target: usize,

    /// Frames discarded after switching targets (milliseconds)
    pub settle_delay_ms: u64,

    /// Normalized target positions, used on both axes
    pub grid: Vec<f64>,

    /// Where samples are stored
    pub data_path: PathBuf,

    /// Where the fitted model is stored
    pub model_path: PathBuf,
}

/// Gaze pre-filter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter type with optional parameter, e.g. `none`, `exponential:0.5`, `moving_average:5`, `median:5`
    pub kind: String,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            smoothing: DEFAULT_SMOOTHING,
            hold_on_blink: true,
            hold_extra_ms: DEFAULT_HOLD_EXTRA_MS,
            deadzone_px: DEFAULT_DEADZONE_PX,
            max_step_px: DEFAULT_MAX_STEP_PX,
            sensitivity_gain: DEFAULT_SENSITIVITY_GAIN,
            far_threshold_px: DEFAULT_FAR_THRESHOLD_PX,
            alpha_far: DEFAULT_ALPHA_FAR,
        }
    }
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            ear_click_threshold: DEFAULT_EAR_CLICK_THRESHOLD,
            click_cooldown_ms: DEFAULT_CLICK_COOLDOWN_MS,
            double_blink_window_ms: DEFAULT_DOUBLE_BLINK_WINDOW_MS,
            enable_right_click: true,
            enable_double_click: false,
        }
    }
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self {
            dwell_ms: DEFAULT_DWELL_MS,
            repeat_interval_ms: DEFAULT_REPEAT_INTERVAL_MS,
            repeating: false,
            poll_interval_ms: DEFAULT_DWELL_POLL_MS,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            samples_per_target: DEFAULT_SAMPLES_PER_TARGET,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            grid: DEFAULT_CALIBRATION_GRID.to_vec(),
            data_path: PathBuf::from("data/raw/calibration.csv"),
            model_path: PathBuf::from("data/models/calibration_model.yaml"),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kind: "none".to_string(),
        }
    }
}

impl MotionConfig {
    /// Post-reopen hold as a duration
    #[must_use]
    pub const fn hold_extra(&self) -> Duration {
        Duration::from_millis(self.hold_extra_ms)
    }
}

impl BlinkConfig {
    /// Click cooldown as a duration
    #[must_use]
    pub const fn click_cooldown(&self) -> Duration {
        Duration::from_millis(self.click_cooldown_ms)
    }

    /// Double blink window as a duration
    #[must_use]
    pub const fn double_blink_window(&self) -> Duration {
        Duration::from_millis(self.double_blink_window_ms)
    }
}

impl DwellConfig {
    /// Dwell threshold as a duration
    #[must_use]
    pub const fn dwell_threshold(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    /// Repeat interval as a duration
    #[must_use]
    pub const fn repeat_interval(&self) -> Duration {
        Duration::from_millis(self.repeat_interval_ms)
    }

    /// Poll interval as a duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl CalibrationConfig {
    /// Settle delay as a duration
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl ScreenConfig {
    /// Screen bounds if both dimensions are configured
    #[must_use]
    pub fn bounds(&self) -> Option<ScreenBounds> {
        Some(ScreenBounds::new(self.width?, self.height?))
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create the configured gaze pre-filter
    pub fn create_filter(&self) -> Result<Box<dyn GazeFilter>> {
        crate::filters::create_filter(&self.gaze_filter.kind)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let unit = |value: f64, name: &str| {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(Error::ConfigError(format!("{name} must be in (0, 1], got {value}")))
            }
        };
        let non_negative = |value: f64, name: &str| {
            if value >= 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(Error::ConfigError(format!("{name} must be a non-negative number, got {value}")))
            }
        };

        // Motion
        unit(self.motion.smoothing, "Smoothing")?;
        unit(self.motion.alpha_far, "Far alpha")?;
        non_negative(self.motion.deadzone_px, "Deadzone")?;
        non_negative(self.motion.far_threshold_px, "Far threshold")?;
        if !(self.motion.max_step_px > 0.0 && self.motion.max_step_px.is_finite()) {
            return Err(Error::ConfigError("Max step must be greater than 0".to_string()));
        }
        if !(self.motion.sensitivity_gain > 0.0 && self.motion.sensitivity_gain.is_finite()) {
            return Err(Error::ConfigError("Sensitivity gain must be greater than 0".to_string()));
        }

        // Blink
        if !(self.blink.ear_click_threshold > 0.0 && self.blink.ear_click_threshold < 1.0) {
            return Err(Error::ConfigError(
                "EAR click threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.blink.double_blink_window_ms == 0 {
            return Err(Error::ConfigError("Double blink window must be greater than 0".to_string()));
        }

        // Dwell
        if self.dwell.dwell_ms == 0 {
            return Err(Error::ConfigError("Dwell time must be greater than 0".to_string()));
        }
        if self.dwell.repeat_interval_ms == 0 {
            return Err(Error::ConfigError("Repeat interval must be greater than 0".to_string()));
        }
        if self.dwell.poll_interval_ms == 0 {
            return Err(Error::ConfigError("Dwell poll interval must be greater than 0".to_string()));
        }

        // Calibration
        if self.calibration.samples_per_target == 0 {
            return Err(Error::ConfigError("Samples per target must be greater than 0".to_string()));
        }
        if self.calibration.grid.len() < 2 {
            return Err(Error::ConfigError(
                "Calibration grid needs at least two positions per axis".to_string(),
            ));
        }
        if let Some(bad) = self.calibration.grid.iter().find(|f| !(0.0..=1.0).contains(*f)) {
            return Err(Error::ConfigError(format!(
                "Calibration grid positions must be between 0.0 and 1.0, got {bad}"
            )));
        }

        // Screen
        if self.screen.width == Some(0) || self.screen.height == Some(0) {
            return Err(Error::ConfigError("Screen dimensions must be greater than 0".to_string()));
        }

        // Filter
        crate::filters::create_filter(&self.gaze_filter.kind)?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Eye Mouse Configuration

# Display size (leave empty to ask the display server)
screen:
  width: null
  height: null

# Cursor stabilisation
motion:
  smoothing: 0.22
  hold_on_blink: true
  hold_extra_ms: 120
  deadzone_px: 4.0
  max_step_px: 35.0
  sensitivity_gain: 1.6
  far_threshold_px: 120.0
  alpha_far: 0.35

# Blink clicks (double blink on one eye)
blink:
  ear_click_threshold: 0.20
  click_cooldown_ms: 300
  double_blink_window_ms: 600
  enable_right_click: true
  enable_double_click: false

# Dwell selection
dwell:
  dwell_ms: 1200
  repeat_interval_ms: 140
  repeating: false
  poll_interval_ms: 50

# Calibration session
calibration:
  samples_per_target: 40
  settle_delay_ms: 2000
  grid: [0.15, 0.5, 0.85]
  data_path: "data/raw/calibration.csv"
  model_path: "data/models/calibration_model.yaml"

# Gaze centroid pre-filter (none, exponential:ALPHA, moving_average:N, median:N)
gaze_filter:
  kind: "none"
"#;
