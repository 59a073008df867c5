//! Hands-free pointer control from eye landmarks.
//!
//! This library turns a stream of per-frame eye landmarks into pointer
//! movement and clicks:
//! - a short calibration session fits a linear gaze → screen model
//! - every frame the gaze centroid is mapped through that model and
//!   stabilised against blinks and jitter
//! - a double blink of one eye clicks (left eye: left button, right eye:
//!   right button)
//! - dwell selection fires on-screen elements after a sustained gaze
//!
//! Landmark extraction itself (camera capture, face mesh) happens outside
//! this crate; frames arrive through a [`capture::LandmarkSource`].
//!
//! # Examples
//!
//! ## Calibration
//!
//! ```no_run
//! use eye_mouse::{
//!     calibration::{dataset, CalibrationModel, CalibrationSession},
//!     capture::JsonLinesSource,
//!     config::Config,
//!     gaze_mapper::ScreenBounds,
//! };
//! use std::io::BufReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let session = CalibrationSession::new(&config.calibration, ScreenBounds::new(1920, 1080));
//!
//! let mut source = JsonLinesSource::new(BufReader::new(std::io::stdin()));
//! let samples = session.run(&mut source)?;
//! dataset::write_samples(&config.calibration.data_path, &samples)?;
//!
//! let model = CalibrationModel::fit(&samples)?;
//! println!("R² = {:.3}", model.evaluate(&samples).r_squared);
//! model.save(&config.calibration.model_path)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Running the control loop
//!
//! ```no_run
//! use eye_mouse::{
//!     app::ControlLoop,
//!     calibration::CalibrationModel,
//!     capture::JsonLinesSource,
//!     config::Config,
//!     cursor_control::NullPointer,
//!     gaze_mapper::ScreenBounds,
//!     stop::StopToken,
//! };
//! use std::io::BufReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let screen = ScreenBounds::new(1920, 1080);
//! let model = CalibrationModel::load(&config.calibration.model_path)?;
//!
//! let mut control = ControlLoop::new(&config, model, screen)?;
//! let mut source = JsonLinesSource::new(BufReader::new(std::io::stdin()));
//! let mut pointer = NullPointer::new(Some(screen));
//!
//! let summary = control.run(&mut source, &mut pointer, &StopToken::new(), None)?;
//! println!("{} frames, {} clicks", summary.frames, summary.clicks);
//! # Ok(())
//! # }
//! ```
//!
//! ## Dwell selection
//!
//! ```no_run
//! use eye_mouse::{
//!     dwell::{DwellBoard, DwellSettings, Rect},
//!     eye_metrics::Point2,
//! };
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut board = DwellBoard::new(DwellSettings::default());
//! let key = board.add(Rect::new(100.0, 100.0, 120.0, 95.0));
//! board.bind(key, || println!("selected"))?;
//!
//! // Called by a 50 ms scheduler with the current gaze point
//! let fired = board.poll(Some(Point2::new(150.0, 140.0)), Duration::from_millis(50));
//! assert!(fired.is_empty());
//! # Ok(())
//! # }
//! ```

/// Eye aspect ratio and centroid extraction
pub mod eye_metrics;

/// Calibration session, model fitting and persistence
pub mod calibration;

/// Gaze centroid to screen target mapping
pub mod gaze_mapper;

/// Cursor stabilisation
pub mod motion;

/// Double-blink click detection
pub mod blink;

/// Dwell selection for on-screen elements
pub mod dwell;

/// Smoothing filters for the raw gaze centroid
pub mod filters;

/// Landmark frame sources
pub mod capture;

/// Latest-value feedback hand-off
pub mod feedback;

/// Cooperative cancellation
pub mod stop;

/// Utility functions for coordinate conversion
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main control loop
pub mod app;

/// Cursor control module for X11 systems
pub mod cursor_control;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
