//! Landmark frame sources.
//!
//! Face landmark extraction happens outside this crate. A source yields one
//! [`LandmarkFrame`] per captured video frame; `Ok(None)` means the stream
//! ended cleanly and `Err` means the capture itself failed.

use crate::{eye_metrics::LandmarkFrame, Error, Result};
use log::debug;
use std::collections::VecDeque;
use std::io::BufRead;

/// Anything that produces landmark frames in capture order
pub trait LandmarkSource: Send {
    /// Pull the next frame
    ///
    /// # Errors
    ///
    /// Returns `Capture` when the underlying source is no longer usable
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>>;
}

/// Reads newline-delimited JSON frames, e.g. piped from a landmark detector
pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    line_number: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    /// Wrap a buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead + Send> LandmarkSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .map_err(|e| Error::Capture(format!("landmark stream read failed: {e}")))?;
            if read == 0 {
                debug!("Landmark stream ended after {} lines", self.line_number);
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return serde_json::from_str(trimmed).map(Some).map_err(|e| {
                Error::Capture(format!("malformed landmark frame on line {}: {e}", self.line_number))
            });
        }
    }
}

/// Replays an in-memory frame sequence, optionally failing at the end
#[derive(Debug, Default)]
pub struct ReplaySource {
    frames: VecDeque<LandmarkFrame>,
    failure: Option<String>,
}

impl ReplaySource {
    /// Replay the given frames, then end cleanly
    pub fn new<I: IntoIterator<Item = LandmarkFrame>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            failure: None,
        }
    }

    /// After the frames run out, report a capture failure instead of ending
    #[must_use]
    pub fn failing_with(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Frames not yet delivered
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl LandmarkSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        match self.frames.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None => match self.failure.take() {
                Some(reason) => Err(Error::Capture(reason)),
                None => Ok(None),
            },
        }
    }
}
