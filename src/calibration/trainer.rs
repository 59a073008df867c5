//! Guided calibration session over a fixed target grid.

use super::CalibrationSample;
use crate::{
    capture::LandmarkSource,
    config::CalibrationConfig,
    eye_metrics::Point2,
    gaze_mapper::ScreenBounds,
    stop::StopToken,
    Error, Result,
};
use log::{debug, info};
use std::time::Duration;

/// Targets for a square grid of normalized positions, row-major, in whole screen pixels
#[must_use]
pub fn target_grid(screen: ScreenBounds, fractions: &[f64]) -> Vec<Point2> {
    let width = f64::from(screen.width);
    let height = f64::from(screen.height);

    fractions
        .iter()
        .flat_map(|&fy| {
            fractions
                .iter()
                .map(move |&fx| Point2::new((width * fx).trunc(), (height * fy).trunc()))
        })
        .collect()
}

/// Drives sample collection for every grid target
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    screen: ScreenBounds,
    grid: Vec<f64>,
    samples_per_target: usize,
    settle_delay: Duration,
    stop: StopToken,
}

impl CalibrationSession {
    /// Create a session from configuration
    #[must_use]
    pub fn new(config: &CalibrationConfig, screen: ScreenBounds) -> Self {
        Self {
            screen,
            grid: config.grid.clone(),
            samples_per_target: config.samples_per_target,
            settle_delay: config.settle_delay(),
            stop: StopToken::new(),
        }
    }

    /// Stop collecting as soon as this token is triggered
    #[must_use]
    pub fn with_stop_token(mut self, stop: StopToken) -> Self {
        self.stop = stop;
        self
    }

    /// Screen targets in presentation order
    #[must_use]
    pub fn targets(&self) -> Vec<Point2> {
        target_grid(self.screen, &self.grid)
    }

    /// Collect `sample_count` samples while the user fixates `target`
    ///
    /// Frames inside the settle delay (measured from the first frame seen
    /// for this target) are discarded, as are frames without a face.
    ///
    /// # Errors
    ///
    /// Returns `Capture` if the source fails or ends early, `Cancelled` if
    /// the stop token fires
    pub fn collect_sample(
        &self,
        target: Point2,
        source: &mut dyn LandmarkSource,
        sample_count: usize,
    ) -> Result<Vec<CalibrationSample>> {
        let mut samples = Vec::with_capacity(sample_count);
        let mut settle_start: Option<Duration> = None;
        let mut skipped = 0usize;

        while samples.len() < sample_count {
            if self.stop.is_stopped() {
                return Err(Error::Cancelled);
            }

            let frame = source.next_frame()?.ok_or_else(|| {
                Error::Capture(format!(
                    "landmark stream ended after {} of {sample_count} samples for target ({}, {})",
                    samples.len(),
                    target.x,
                    target.y
                ))
            })?;

            let start = *settle_start.get_or_insert(frame.timestamp());
            if frame.timestamp().saturating_sub(start) < self.settle_delay {
                continue;
            }

            match frame.eyes {
                Some(eyes) => samples.push(CalibrationSample::new(eyes.gaze_centroid(), target)),
                None => skipped += 1,
            }
        }

        debug!(
            "Target ({}, {}): {} samples, {} frames without a face",
            target.x,
            target.y,
            samples.len(),
            skipped
        );
        Ok(samples)
    }

    /// Run the whole grid, calling `on_target` before each target is sampled
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`CalibrationSession::collect_sample`]
    pub fn run_with<F>(&self, source: &mut dyn LandmarkSource, mut on_target: F) -> Result<Vec<CalibrationSample>>
    where
        F: FnMut(usize, Point2),
    {
        let targets = self.targets();
        let mut samples = Vec::with_capacity(targets.len() * self.samples_per_target);

        for (index, target) in targets.into_iter().enumerate() {
            info!("Look at target {} ({}, {})", index + 1, target.x, target.y);
            on_target(index, target);
            samples.extend(self.collect_sample(target, source, self.samples_per_target)?);
        }

        info!("Calibration session finished with {} samples", samples.len());
        Ok(samples)
    }

    /// Run the whole grid
    ///
    /// # Errors
    ///
    /// See [`CalibrationSession::run_with`]
    pub fn run(&self, source: &mut dyn LandmarkSource) -> Result<Vec<CalibrationSample>> {
        self.run_with(source, |_, _| {})
    }
}
