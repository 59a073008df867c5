//! Linear gaze → screen model.
//!
//! Each screen axis is an independent affine function of the gaze centroid:
//! `screen = eye_x * gx + eye_y * gy + intercept`. Both axes are solved in one
//! least-squares pass over a mean-centred design matrix, which keeps the SVD
//! well conditioned when centroids sit hundreds of pixels from the origin.

use super::CalibrationSample;
use crate::{
    constants::{MIN_CALIBRATION_SAMPLES, MIN_DISTINCT_TARGETS, RANK_TOLERANCE},
    eye_metrics::{centroid, Point2},
    Error, Result,
};
use log::{debug, info};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Coefficients of one output axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisCoefficients {
    /// Weight of the gaze x coordinate
    pub eye_x: f64,
    /// Weight of the gaze y coordinate
    pub eye_y: f64,
    /// Constant term
    pub intercept: f64,
}

impl AxisCoefficients {
    fn apply(&self, gaze: Point2) -> f64 {
        self.eye_x.mul_add(gaze.x, self.eye_y * gaze.y) + self.intercept
    }

    fn is_finite(&self) -> bool {
        self.eye_x.is_finite() && self.eye_y.is_finite() && self.intercept.is_finite()
    }
}

/// Fitted calibration, immutable once trained
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationModel {
    /// Screen x as a function of gaze
    pub x: AxisCoefficients,
    /// Screen y as a function of gaze
    pub y: AxisCoefficients,
}

/// Goodness of fit on a sample set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    /// Coefficient of determination, averaged over both axes
    pub r_squared: f64,
    /// Root mean squared Euclidean error in screen pixels
    pub rmse_px: f64,
    /// Largest Euclidean error in screen pixels
    pub max_error_px: f64,
}

impl CalibrationModel {
    /// Fit the model by ordinary least squares
    ///
    /// # Errors
    ///
    /// Returns `InsufficientData` if there are too few samples, too few
    /// distinct targets, collinear targets, or collinear gaze centroids
    pub fn fit(samples: &[CalibrationSample]) -> Result<Self> {
        if samples.len() < MIN_CALIBRATION_SAMPLES {
            return Err(Error::InsufficientData(format!(
                "{} samples, need at least {MIN_CALIBRATION_SAMPLES}",
                samples.len()
            )));
        }

        let distinct = distinct_targets(samples);
        if distinct < MIN_DISTINCT_TARGETS {
            return Err(Error::InsufficientData(format!(
                "{distinct} distinct targets, need at least {MIN_DISTINCT_TARGETS}"
            )));
        }

        let spread = target_spread_rank(samples);
        if spread < 2 {
            return Err(Error::InsufficientData(format!(
                "calibration targets are collinear (target rank {spread})"
            )));
        }

        let mean = centroid(samples.iter().map(|s| &s.gaze_centroid));
        let design = DMatrix::from_fn(samples.len(), 3, |row, col| {
            let gaze = samples[row].gaze_centroid;
            match col {
                0 => gaze.x - mean.x,
                1 => gaze.y - mean.y,
                _ => 1.0,
            }
        });
        let targets = DMatrix::from_fn(samples.len(), 2, |row, col| {
            let target = samples[row].target_screen_point;
            if col == 0 {
                target.x
            } else {
                target.y
            }
        });

        let svd = design.svd(true, true);
        let eps = svd.singular_values.max() * RANK_TOLERANCE;
        let rank = svd.rank(eps);
        debug!("Calibration design singular values: {:?}", svd.singular_values.as_slice());
        if rank < 3 {
            return Err(Error::InsufficientData(format!(
                "gaze centroids are collinear (design rank {rank})"
            )));
        }

        let solution = svd
            .solve(&targets, eps)
            .map_err(|e| Error::InsufficientData(e.to_string()))?;

        let axis = |col: usize| {
            let eye_x = solution[(0, col)];
            let eye_y = solution[(1, col)];
            AxisCoefficients {
                eye_x,
                eye_y,
                intercept: solution[(2, col)] - eye_x * mean.x - eye_y * mean.y,
            }
        };
        let model = Self { x: axis(0), y: axis(1) };

        if !model.x.is_finite() || !model.y.is_finite() {
            return Err(Error::InsufficientData("fit produced non-finite coefficients".to_string()));
        }

        info!(
            "Fitted calibration model on {} samples over {} targets",
            samples.len(),
            distinct
        );
        Ok(model)
    }

    /// Map a gaze centroid to an (unclamped) screen point
    #[must_use]
    pub fn predict(&self, gaze: Point2) -> Point2 {
        Point2::new(self.x.apply(gaze), self.y.apply(gaze))
    }

    /// Score the model against a sample set
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate(&self, samples: &[CalibrationSample]) -> FitReport {
        if samples.is_empty() {
            return FitReport {
                r_squared: 0.0,
                rmse_px: 0.0,
                max_error_px: 0.0,
            };
        }

        let n = samples.len() as f64;
        let mean_target = centroid(samples.iter().map(|s| &s.target_screen_point));

        let mut ss_res = (0.0, 0.0);
        let mut ss_tot = (0.0, 0.0);
        let mut squared_error = 0.0;
        let mut max_error: f64 = 0.0;

        for sample in samples {
            let predicted = self.predict(sample.gaze_centroid);
            let target = sample.target_screen_point;
            ss_res.0 += (target.x - predicted.x).powi(2);
            ss_res.1 += (target.y - predicted.y).powi(2);
            ss_tot.0 += (target.x - mean_target.x).powi(2);
            ss_tot.1 += (target.y - mean_target.y).powi(2);

            let error = predicted.distance(&target);
            squared_error += error * error;
            max_error = max_error.max(error);
        }

        let r2 = |res: f64, tot: f64| {
            if tot > 0.0 {
                1.0 - res / tot
            } else if res == 0.0 {
                1.0
            } else {
                0.0
            }
        };

        FitReport {
            r_squared: (r2(ss_res.0, ss_tot.0) + r2(ss_res.1, ss_tot.1)) / 2.0,
            rmse_px: (squared_error / n).sqrt(),
            max_error_px: max_error,
        }
    }

    /// Write the model as YAML, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        info!("Saved calibration model to {}", path.display());
        Ok(())
    }

    /// Load a model written by [`CalibrationModel::save`]
    ///
    /// # Errors
    ///
    /// Returns `ModelNotFound` if the file does not exist, or a parse error
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ModelNotFound(path.to_path_buf()));
        }

        let model: Self = serde_yaml::from_str(&std::fs::read_to_string(path)?)?;
        if !model.x.is_finite() || !model.y.is_finite() {
            return Err(Error::InvalidInput(format!(
                "model {} contains non-finite coefficients",
                path.display()
            )));
        }
        info!("Loaded calibration model from {}", path.display());
        Ok(model)
    }
}

fn distinct_targets(samples: &[CalibrationSample]) -> usize {
    samples
        .iter()
        .map(|s| (s.target_screen_point.x.to_bits(), s.target_screen_point.y.to_bits()))
        .collect::<HashSet<_>>()
        .len()
}

/// Rank of the mean-centred target points; below 2 means they lie on a line
fn target_spread_rank(samples: &[CalibrationSample]) -> usize {
    let mean = centroid(samples.iter().map(|s| &s.target_screen_point));
    let centred = DMatrix::from_fn(samples.len(), 2, |row, col| {
        let target = samples[row].target_screen_point;
        if col == 0 {
            target.x - mean.x
        } else {
            target.y - mean.y
        }
    });
    let svd = centred.svd(false, false);
    svd.rank(svd.singular_values.max() * RANK_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(gx: f64, gy: f64, tx: f64, ty: f64) -> CalibrationSample {
        CalibrationSample::new(Point2::new(gx, gy), Point2::new(tx, ty))
    }

    #[test]
    fn test_fit_exact_affine_map() {
        // screen_x = 3gx - gy + 10, screen_y = 0.5gx + 2gy - 4
        let samples: Vec<_> = [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0), (5.0, 3.0)]
            .iter()
            .map(|&(gx, gy)| sample(gx, gy, 3.0 * gx - gy + 10.0, 0.5 * gx + 2.0 * gy - 4.0))
            .collect();

        let model = CalibrationModel::fit(&samples).unwrap();
        assert!((model.x.eye_x - 3.0).abs() < 1e-9);
        assert!((model.x.eye_y + 1.0).abs() < 1e-9);
        assert!((model.x.intercept - 10.0).abs() < 1e-9);
        assert!((model.y.eye_x - 0.5).abs() < 1e-9);
        assert!((model.y.eye_y - 2.0).abs() < 1e-9);
        assert!((model.y.intercept + 4.0).abs() < 1e-9);

        let report = model.evaluate(&samples);
        assert!(report.rmse_px < 1e-9);
        assert!((report.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_rejects_too_few_samples() {
        let samples = vec![sample(0.0, 0.0, 0.0, 0.0), sample(1.0, 0.0, 1.0, 0.0)];
        assert!(matches!(
            CalibrationModel::fit(&samples),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_fit_rejects_three_targets() {
        let samples: Vec<_> = (0..12)
            .map(|i| {
                let (tx, ty) = [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)][i % 3];
                sample(tx / 2.0 + i as f64 * 0.01, ty / 2.0, tx, ty)
            })
            .collect();
        assert!(matches!(
            CalibrationModel::fit(&samples),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_fit_rejects_collinear_gaze() {
        let samples: Vec<_> = (0..6)
            .map(|i| {
                let t = f64::from(i);
                sample(t, 2.0 * t + 1.0, t * 100.0, t * t * 50.0)
            })
            .collect();
        assert!(matches!(
            CalibrationModel::fit(&samples),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_load_missing_model() {
        let result = CalibrationModel::load("/nonexistent/calibration_model.yaml");
        assert!(matches!(result, Err(Error::ModelNotFound(_))));
    }
}
