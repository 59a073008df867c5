//! Constants used throughout the application

/// Face-mesh indices of the left eye contour, in EAR order (p1..p6)
pub const LEFT_EYE_INDICES: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Face-mesh indices of the right eye contour, in EAR order (p1..p6)
pub const RIGHT_EYE_INDICES: [usize; 6] = [263, 387, 385, 362, 380, 373];

/// Points per eye used for EAR and centroid
pub const EYE_POINT_COUNT: usize = 6;

/// Added to the horizontal eye width so a degenerate eye never divides by zero
pub const EAR_EPSILON: f64 = 1e-6;

/// Default motion parameters
pub const DEFAULT_SMOOTHING: f64 = 0.22;
pub const DEFAULT_HOLD_EXTRA_MS: u64 = 120;
pub const DEFAULT_DEADZONE_PX: f64 = 4.0;
pub const DEFAULT_MAX_STEP_PX: f64 = 35.0;
pub const DEFAULT_SENSITIVITY_GAIN: f64 = 1.6;
pub const DEFAULT_FAR_THRESHOLD_PX: f64 = 120.0;
pub const DEFAULT_ALPHA_FAR: f64 = 0.35;

/// Default blink parameters
pub const DEFAULT_EAR_CLICK_THRESHOLD: f64 = 0.20;
pub const DEFAULT_CLICK_COOLDOWN_MS: u64 = 300;
pub const DEFAULT_DOUBLE_BLINK_WINDOW_MS: u64 = 600;

/// Default dwell parameters
pub const DEFAULT_DWELL_MS: u64 = 1200;
pub const DEFAULT_REPEAT_INTERVAL_MS: u64 = 140;
pub const DEFAULT_DWELL_POLL_MS: u64 = 50;

/// Default calibration session parameters
pub const DEFAULT_SAMPLES_PER_TARGET: usize = 40;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;
pub const DEFAULT_CALIBRATION_GRID: [f64; 3] = [0.15, 0.5, 0.85];

/// Minimum number of samples and distinct targets accepted by the fit
pub const MIN_CALIBRATION_SAMPLES: usize = 4;
pub const MIN_DISTINCT_TARGETS: usize = 4;

/// Relative singular value cutoff below which the design matrix counts as rank-deficient
pub const RANK_TOLERANCE: f64 = 1e-9;

/// Screen size used when neither the config nor the display provides one
pub const FALLBACK_SCREEN_WIDTH: u32 = 1920;
pub const FALLBACK_SCREEN_HEIGHT: u32 = 1080;

/// Default gaze pre-filter parameters
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 5;
pub const DEFAULT_MEDIAN_WINDOW: usize = 5;
pub const DEFAULT_EXPONENTIAL_ALPHA: f64 = 0.5;

