//! CSV persistence for calibration samples (`eye_x,eye_y,screen_x,screen_y`).

use super::CalibrationSample;
use crate::{eye_metrics::Point2, Error, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct SampleRow {
    eye_x: f64,
    eye_y: f64,
    screen_x: f64,
    screen_y: f64,
}

impl From<&CalibrationSample> for SampleRow {
    fn from(sample: &CalibrationSample) -> Self {
        Self {
            eye_x: sample.gaze_centroid.x,
            eye_y: sample.gaze_centroid.y,
            screen_x: sample.target_screen_point.x,
            screen_y: sample.target_screen_point.y,
        }
    }
}

impl From<SampleRow> for CalibrationSample {
    fn from(row: SampleRow) -> Self {
        Self::new(Point2::new(row.eye_x, row.eye_y), Point2::new(row.screen_x, row.screen_y))
    }
}

/// Write samples in order, one row each, with a header
///
/// # Errors
///
/// Returns an error if the file cannot be created or written
pub fn write_samples<P: AsRef<Path>>(path: P, samples: &[CalibrationSample]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for sample in samples {
        writer.serialize(SampleRow::from(sample))?;
    }
    writer.flush()?;

    info!("Saved {} calibration samples to {}", samples.len(), path.display());
    Ok(())
}

/// Read samples written by [`write_samples`]
///
/// # Errors
///
/// Returns `CalibrationDataNotFound` if the file is missing, or a CSV error
pub fn read_samples<P: AsRef<Path>>(path: P) -> Result<Vec<CalibrationSample>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::CalibrationDataNotFound(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let samples = reader
        .deserialize::<SampleRow>()
        .map(|row| row.map(CalibrationSample::from).map_err(Error::from))
        .collect::<Result<Vec<_>>>()?;

    info!("Loaded {} calibration samples from {}", samples.len(), path.display());
    Ok(samples)
}
