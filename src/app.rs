//! The per-frame control loop: landmarks in, pointer moves and clicks out.

use crate::{
    blink::{BlinkPair, ClickEvent},
    calibration::CalibrationModel,
    capture::LandmarkSource,
    config::Config,
    cursor_control::PointerSurface,
    error::Result,
    eye_metrics::{EyeMetrics, LandmarkFrame, Point2},
    feedback::{Feedback, LatestSender},
    filters::GazeFilter,
    gaze_mapper::{GazeMapper, ScreenBounds},
    motion::{MotionInput, MotionStabilizer},
    stop::StopToken,
    utils::safe_cast::to_pixel,
};
use log::{debug, error, info};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Result of processing one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// Frame timestamp
    pub timestamp: Duration,
    /// Left and right eye metrics, if a face was detected
    pub metrics: Option<(EyeMetrics, EyeMetrics)>,
    /// Mapped screen target before stabilisation
    pub raw_target: Option<Point2>,
    /// Cursor position after stabilisation
    pub cursor: Option<Point2>,
    /// Clicks recognised on this frame
    pub clicks: Vec<ClickEvent>,
}

/// Counters reported when a session ends cleanly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Frames processed
    pub frames: usize,
    /// Frames in which a face was detected
    pub frames_with_face: usize,
    /// Pointer moves sent
    pub moves: usize,
    /// Clicks sent
    pub clicks: usize,
}

/// Mapper, stabilizer and blink detectors for one tracking session
pub struct ControlLoop {
    mapper: GazeMapper,
    filter: Box<dyn GazeFilter>,
    stabilizer: MotionStabilizer,
    blinks: BlinkPair,
    hold_extra: Duration,
    last_pixel: Option<(i32, i32)>,
}

impl ControlLoop {
    /// Build a session from configuration and a loaded model
    ///
    /// # Errors
    ///
    /// Returns `FilterError` if the configured gaze filter is invalid
    pub fn new(config: &Config, model: CalibrationModel, screen: ScreenBounds) -> Result<Self> {
        let filter = config.create_filter()?;
        info!(
            "Control loop on {}x{} screen, gaze filter: {}",
            screen.width,
            screen.height,
            filter.name()
        );

        Ok(Self {
            mapper: GazeMapper::new(model, screen),
            filter,
            stabilizer: MotionStabilizer::new(config.motion.clone(), screen),
            blinks: BlinkPair::new(&config.blink),
            hold_extra: config.motion.hold_extra(),
            last_pixel: None,
        })
    }

    /// Blink detectors
    #[must_use]
    pub const fn blinks(&self) -> &BlinkPair {
        &self.blinks
    }

    /// Current cursor position
    #[must_use]
    pub fn cursor(&self) -> Option<Point2> {
        self.stabilizer.position()
    }

    /// Run one frame through metrics, blink detection, mapping and stabilisation
    ///
    /// Blink state is updated before the stabilizer so the frame on which an
    /// eye reopens is already inside the post-blink hold.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameOutput {
        let now = frame.timestamp();

        let Some(eyes) = &frame.eyes else {
            let cursor = self.stabilizer.update(&MotionInput {
                timestamp: now,
                ..MotionInput::default()
            });
            return FrameOutput {
                timestamp: now,
                metrics: None,
                raw_target: None,
                cursor,
                clicks: Vec::new(),
            };
        };

        let (left, right) = eyes.metrics();
        let clicks = self.blinks.update(left.aspect_ratio, right.aspect_ratio, now);

        let centroid = self.filter.apply(eyes.gaze_centroid());
        let raw_target = self.mapper.map(centroid);

        let cursor = self.stabilizer.update(&MotionInput {
            raw_target: Some(raw_target),
            left_closed: self.blinks.left.is_closed(),
            right_closed: self.blinks.right.is_closed(),
            recently_reopened: self.blinks.reopened_within(now, self.hold_extra),
            timestamp: now,
        });

        FrameOutput {
            timestamp: now,
            metrics: Some((left, right)),
            raw_target: Some(raw_target),
            cursor,
            clicks,
        }
    }

    /// Pull frames until the source ends or `stop` fires
    ///
    /// A move is only sent when the whole-pixel cursor position changes.
    ///
    /// # Errors
    ///
    /// Returns the capture error if the source fails (logged once here), or
    /// `CursorControl` if the pointer can no longer be driven
    pub fn run<S, P>(
        &mut self,
        source: &mut S,
        pointer: &mut P,
        stop: &StopToken,
        feedback: Option<&LatestSender<Feedback>>,
    ) -> Result<SessionSummary>
    where
        S: LandmarkSource + ?Sized,
        P: PointerSurface + ?Sized,
    {
        let mut summary = SessionSummary::default();

        loop {
            if stop.is_stopped() {
                info!("Stop requested after {} frames", summary.frames);
                break;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("Landmark stream ended after {} frames", summary.frames);
                    break;
                }
                Err(e) => {
                    error!("Capture failed after {} frames: {e}", summary.frames);
                    return Err(e);
                }
            };

            let output = self.process_frame(&frame);
            summary.frames += 1;
            if output.metrics.is_some() {
                summary.frames_with_face += 1;
            }

            if let Some(cursor) = output.cursor {
                let pixel = to_pixel(cursor);
                if self.last_pixel != Some(pixel) {
                    pointer.move_to(pixel.0, pixel.1)?;
                    self.last_pixel = Some(pixel);
                    summary.moves += 1;
                }
            }

            for click in &output.clicks {
                pointer.click(click.button)?;
                summary.clicks += 1;
            }

            if let Some(tx) = feedback {
                tx.publish(self.feedback(&output));
            }
        }

        debug!("Session summary: {:?}", summary);
        Ok(summary)
    }

    fn feedback(&self, output: &FrameOutput) -> Feedback {
        Feedback {
            timestamp: output.timestamp,
            face_detected: output.metrics.is_some(),
            left_ear: output.metrics.map(|(l, _)| l.aspect_ratio),
            right_ear: output.metrics.map(|(_, r)| r.aspect_ratio),
            left_blink: *self.blinks.left.state(),
            right_blink: *self.blinks.right.state(),
            cursor: output.cursor,
        }
    }
}

/// Run a control loop on a dedicated worker thread
///
/// # Errors
///
/// Returns `Io` if the thread cannot be spawned
pub fn spawn_control_loop<P>(
    mut control: ControlLoop,
    mut source: Box<dyn LandmarkSource>,
    mut pointer: P,
    stop: StopToken,
    feedback: Option<LatestSender<Feedback>>,
) -> Result<JoinHandle<Result<SessionSummary>>>
where
    P: PointerSurface + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("control-loop".to_string())
        .spawn(move || control.run(source.as_mut(), &mut pointer, &stop, feedback.as_ref()))?;
    Ok(handle)
}
