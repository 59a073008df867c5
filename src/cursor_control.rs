//! Cursor control module for X11-based systems.
//!
//! [`PointerSurface`] is the seam between the control loop and the OS
//! pointer. The X11 backend warps the pointer for moves and injects button
//! events through the XTEST extension for clicks. Calls made on the worker
//! thread are marshalled to the thread that owns the surface through
//! [`MarshaledPointer`] and [`PointerDispatcher`].

use crate::{
    blink::MouseButton,
    Error, Result,
    gaze_mapper::ScreenBounds,
    utils::safe_cast::i32_to_i16_clamp,
};
use log::{debug, info, warn};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;
use x11rb::{
    connection::Connection,
    protocol::{
        xproto::{ConnectionExt, Screen, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT},
        xtest::ConnectionExt as XTestConnectionExt,
    },
    rust_connection::RustConnection,
    CURRENT_TIME,
};

/// Something that can position the pointer and press buttons
pub trait PointerSurface {
    /// Move the pointer to absolute screen pixel `(x, y)`
    ///
    /// # Errors
    ///
    /// Returns `CursorControl` if the backend rejects the move
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;

    /// Press and release `button` at the current position
    ///
    /// # Errors
    ///
    /// Returns `CursorControl` if the backend rejects the click
    fn click(&mut self, button: MouseButton) -> Result<()>;

    /// Display size, when the backend knows it
    fn screen_size(&self) -> Option<ScreenBounds>;
}

/// Cursor control implementation for X11
pub struct CursorController {
    connection: RustConnection,
    screen: Screen,
    screen_width: u16,
    screen_height: u16,
}

impl CursorController {
    /// Connect to the X11 display named by `$DISPLAY`
    pub fn new() -> Result<Self> {
        info!("Initializing X11 cursor controller");

        let (connection, screen_num) = RustConnection::connect(None)
            .map_err(|e| Error::CursorControl(format!("Failed to connect to X11: {e}")))?;

        let screen = connection
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| Error::CursorControl("Failed to get screen".to_string()))?
            .clone();

        let screen_width = screen.width_in_pixels;
        let screen_height = screen.height_in_pixels;

        // Clicks go through XTEST; fail early rather than on the first double blink
        connection
            .xtest_get_version(2, 2)
            .map_err(|e| Error::CursorControl(format!("Failed to query XTEST: {e}")))?
            .reply()
            .map_err(|e| Error::CursorControl(format!("XTEST extension unavailable: {e}")))?;

        info!(
            "Connected to X11 display, screen: {}x{}",
            screen_width, screen_height
        );

        Ok(Self {
            connection,
            screen,
            screen_width,
            screen_height,
        })
    }

    fn fake_button(&self, event_type: u8, detail: u8) -> Result<()> {
        self.connection
            .xtest_fake_input(event_type, detail, CURRENT_TIME, self.screen.root, 0, 0, 0)
            .map_err(|e| Error::CursorControl(format!("Failed to send fake input: {e}")))?;
        Ok(())
    }
}

impl PointerSurface for CursorController {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        let max_x = i32::from(self.screen_width.saturating_sub(1));
        let max_y = i32::from(self.screen_height.saturating_sub(1));
        let x = i32_to_i16_clamp(x.clamp(0, max_x));
        let y = i32_to_i16_clamp(y.clamp(0, max_y));

        debug!("Setting cursor position to ({}, {})", x, y);

        self.connection
            .warp_pointer(x11rb::NONE, self.screen.root, 0, 0, 0, 0, x, y)
            .map_err(|e| Error::CursorControl(format!("Failed to warp pointer: {e}")))?;

        self.connection
            .flush()
            .map_err(|e| Error::CursorControl(format!("Failed to flush connection: {e}")))?;

        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        let detail = match button {
            MouseButton::Left => 1,
            MouseButton::Right => 3,
        };

        debug!("Sending {:?} click", button);

        self.fake_button(BUTTON_PRESS_EVENT, detail)?;
        self.fake_button(BUTTON_RELEASE_EVENT, detail)?;

        self.connection
            .flush()
            .map_err(|e| Error::CursorControl(format!("Failed to flush connection: {e}")))?;

        Ok(())
    }

    fn screen_size(&self) -> Option<ScreenBounds> {
        Some(ScreenBounds::new(
            u32::from(self.screen_width),
            u32::from(self.screen_height),
        ))
    }
}

/// Pointer that only logs; used for dry runs and when no display is available
#[derive(Debug, Default)]
pub struct NullPointer {
    screen: Option<ScreenBounds>,
    position: Option<(i32, i32)>,
    clicks: usize,
}

impl NullPointer {
    /// Create a logging pointer that reports `screen` as its size
    #[must_use]
    pub const fn new(screen: Option<ScreenBounds>) -> Self {
        Self {
            screen,
            position: None,
            clicks: 0,
        }
    }

    /// Last position moved to
    #[must_use]
    pub const fn position(&self) -> Option<(i32, i32)> {
        self.position
    }

    /// Clicks received so far
    #[must_use]
    pub const fn clicks(&self) -> usize {
        self.clicks
    }
}

impl PointerSurface for NullPointer {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        debug!("[dry-run] move to ({x}, {y})");
        self.position = Some((x, y));
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        info!("[dry-run] {:?} click", button);
        self.clicks += 1;
        Ok(())
    }

    fn screen_size(&self) -> Option<ScreenBounds> {
        self.screen
    }
}

/// A pointer call carried across threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerCommand {
    /// Absolute move
    MoveTo {
        /// Horizontal pixel
        x: i32,
        /// Vertical pixel
        y: i32,
    },
    /// Button press and release
    Click(MouseButton),
}

/// Worker-side pointer that forwards every call to a [`PointerDispatcher`]
#[derive(Debug, Clone)]
pub struct MarshaledPointer {
    tx: Sender<PointerCommand>,
    screen: Option<ScreenBounds>,
}

impl MarshaledPointer {
    fn send(&self, command: PointerCommand) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| Error::CursorControl("pointer dispatcher has shut down".to_string()))
    }
}

impl PointerSurface for MarshaledPointer {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.send(PointerCommand::MoveTo { x, y })
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        self.send(PointerCommand::Click(button))
    }

    fn screen_size(&self) -> Option<ScreenBounds> {
        self.screen
    }
}

/// Owner-side end of a marshalled pointer: applies queued commands to the real surface
pub struct PointerDispatcher<P> {
    rx: Receiver<PointerCommand>,
    surface: P,
    applied: usize,
}

/// Split `surface` into a sendable proxy and the dispatcher that owns it
pub fn marshal<P: PointerSurface>(surface: P) -> (MarshaledPointer, PointerDispatcher<P>) {
    let (tx, rx) = mpsc::channel();
    let proxy = MarshaledPointer {
        tx,
        screen: surface.screen_size(),
    };
    (
        proxy,
        PointerDispatcher {
            rx,
            surface,
            applied: 0,
        },
    )
}

impl<P: PointerSurface> PointerDispatcher<P> {
    /// Apply commands until every proxy has been dropped
    pub fn run_until_closed(&mut self) -> usize {
        while let Ok(command) = self.rx.recv() {
            self.apply(command);
        }
        debug!("Pointer dispatcher closed after {} commands", self.applied);
        self.applied
    }

    /// Apply whatever is queued without blocking; returns `false` once all proxies are gone
    pub fn drain(&mut self) -> bool {
        loop {
            match self.rx.try_recv() {
                Ok(command) => self.apply(command),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    /// Wait up to `timeout` for one command; returns `false` once all proxies are gone
    pub fn dispatch_timeout(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(command) => {
                self.apply(command);
                true
            }
            Err(RecvTimeoutError::Timeout) => true,
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Commands applied so far
    #[must_use]
    pub const fn applied(&self) -> usize {
        self.applied
    }

    /// The wrapped surface
    pub const fn surface(&self) -> &P {
        &self.surface
    }

    /// Give back the wrapped surface
    pub fn into_inner(self) -> P {
        self.surface
    }

    fn apply(&mut self, command: PointerCommand) {
        let result = match command {
            PointerCommand::MoveTo { x, y } => self.surface.move_to(x, y),
            PointerCommand::Click(button) => self.surface.click(button),
        };
        // A dropped move or click is not worth stopping the session for
        if let Err(e) = result {
            warn!("Pointer command {:?} failed: {e}", command);
        }
        self.applied += 1;
    }
}
