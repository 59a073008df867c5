//! Per-frame status hand-off from the control loop to a display.
//!
//! The slot holds at most one value. Publishing overwrites whatever the
//! consumer has not taken yet, so a slow display always sees the newest
//! frame and never backs up the control loop.

use crate::{blink::BlinkState, eye_metrics::Point2};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

/// Status of one processed frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feedback {
    /// Frame timestamp
    pub timestamp: Duration,
    /// Whether landmarks were present
    pub face_detected: bool,
    /// Left eye aspect ratio, if a face was detected
    pub left_ear: Option<f64>,
    /// Right eye aspect ratio, if a face was detected
    pub right_ear: Option<f64>,
    /// Left eye blink state after this frame
    pub left_blink: BlinkState,
    /// Right eye blink state after this frame
    pub right_blink: BlinkState,
    /// Cursor position after this frame
    pub cursor: Option<Point2>,
}

struct Slot<T> {
    value: Option<T>,
    closed: bool,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

/// Producer half of a latest-value slot
pub struct LatestSender<T> {
    shared: Arc<Shared<T>>,
}

/// Consumer half of a latest-value slot
pub struct LatestReceiver<T> {
    shared: Arc<Shared<T>>,
}

/// Create a connected single-slot, latest-value-wins channel
#[must_use]
pub fn latest_slot<T>() -> (LatestSender<T>, LatestReceiver<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot {
            value: None,
            closed: false,
        }),
        ready: Condvar::new(),
    });
    (
        LatestSender {
            shared: Arc::clone(&shared),
        },
        LatestReceiver { shared },
    )
}

impl<T> LatestSender<T> {
    /// Store `value`, replacing any value not yet taken
    pub fn publish(&self, value: T) {
        let mut slot = self.shared.slot.lock();
        slot.value = Some(value);
        drop(slot);
        self.shared.ready.notify_one();
    }
}

impl<T> Drop for LatestSender<T> {
    fn drop(&mut self) {
        self.shared.slot.lock().closed = true;
        self.shared.ready.notify_all();
    }
}

impl<T> LatestReceiver<T> {
    /// Take the newest value without waiting
    pub fn try_take(&self) -> Option<T> {
        self.shared.slot.lock().value.take()
    }

    /// Wait up to `timeout` for a value; `None` on timeout or once the sender is gone
    pub fn take_timeout(&self, timeout: Duration) -> Option<T> {
        let mut slot = self.shared.slot.lock();
        if slot.value.is_none() && !slot.closed {
            let _ = self.shared.ready.wait_for(&mut slot, timeout);
        }
        slot.value.take()
    }

    /// Block until a value arrives; `None` once the sender is gone and the slot is empty
    pub fn take(&self) -> Option<T> {
        let mut slot = self.shared.slot.lock();
        while slot.value.is_none() && !slot.closed {
            self.shared.ready.wait(&mut slot);
        }
        slot.value.take()
    }

    /// Whether the sender has been dropped
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.slot.lock().closed
    }
}
