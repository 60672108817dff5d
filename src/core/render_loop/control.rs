//=========================================================================
// Render Loop Control
//=========================================================================
//
// Single-purpose hand-off channels between the dispatcher and the render
// thread, created once at startup.
//
//   ControlSender (dispatcher)          ControlReceiver (render thread)
//     init    ── bounded(1) ───────────>  InitRequest<W>
//     tap     ── unbounded ────────────>  TapEvent
//     pause   ── unbounded ────────────>  PauseRequest { ack }
//     resume  ── unbounded ────────────>  ()
//     resize  ── unbounded ────────────>  ViewportSize
//   StopHandle (engine)
//     stop    ── bounded(1) ───────────>  ()
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use log::warn;

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::ActivityHandle;

//=== Messages ============================================================

/// New window to render into.
#[derive(Debug)]
pub struct InitRequest<W> {
    pub window: W,
    pub activity: Option<ActivityHandle>,
}

/// Screen-space tap (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapEvent {
    pub x: f32,
    pub y: f32,
}

/// Drawable size after a window resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

/// Pause request. The render side acknowledges once its ticker is stopped.
#[derive(Debug)]
pub struct PauseRequest {
    ack: Sender<()>,
}

impl PauseRequest {
    pub(crate) fn new(ack: Sender<()>) -> Self {
        Self { ack }
    }

    /// Signals the waiting dispatcher. No tick is processed after this.
    pub fn acknowledge(self) {
        // The dispatcher may already be gone during shutdown
        let _ = self.ack.send(());
    }
}

//=== ControlClosed =======================================================

/// The render thread is no longer receiving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlClosed(pub &'static str);

impl std::fmt::Display for ControlClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Render loop is not receiving on '{}'", self.0)
    }
}

impl std::error::Error for ControlClosed {}

//=== ControlSender =======================================================

/// Dispatcher-side endpoints.
#[derive(Debug)]
pub struct ControlSender<W> {
    init: Sender<InitRequest<W>>,
    tap: Sender<TapEvent>,
    pause: Sender<PauseRequest>,
    resume: Sender<()>,
    resize: Sender<ViewportSize>,
}

impl<W> ControlSender<W> {
    /// Hands a window to the render thread.
    ///
    /// The slot holds one request. If the previous one has not been taken
    /// yet this warns and then blocks until it is.
    pub fn send_init(&self, request: InitRequest<W>) -> Result<(), ControlClosed> {
        match self.init.try_send(request) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(request)) => {
                warn!(
                    target: "events",
                    "Init slot still occupied by an unprocessed window; blocking until the render loop takes it"
                );
                self.init.send(request).map_err(|_| ControlClosed("init"))
            }
            Err(TrySendError::Disconnected(_)) => Err(ControlClosed("init")),
        }
    }

    pub fn send_tap(&self, tap: TapEvent) -> Result<(), ControlClosed> {
        self.tap.send(tap).map_err(|_| ControlClosed("tap"))
    }

    /// Requests a pause and blocks until the render thread confirms it.
    pub fn pause(&self) -> Result<(), ControlClosed> {
        let (ack, acked) = bounded(1);
        self.pause
            .send(PauseRequest::new(ack))
            .map_err(|_| ControlClosed("pause"))?;
        acked.recv().map_err(|_| ControlClosed("pause"))
    }

    pub fn send_resume(&self) -> Result<(), ControlClosed> {
        self.resume.send(()).map_err(|_| ControlClosed("resume"))
    }

    pub fn send_resize(&self, size: ViewportSize) -> Result<(), ControlClosed> {
        self.resize.send(size).map_err(|_| ControlClosed("resize"))
    }
}

//=== ControlReceiver =====================================================

/// Render-side endpoints.
#[derive(Debug)]
pub struct ControlReceiver<W> {
    pub(crate) init: Receiver<InitRequest<W>>,
    pub(crate) tap: Receiver<TapEvent>,
    pub(crate) pause: Receiver<PauseRequest>,
    pub(crate) resume: Receiver<()>,
    pub(crate) resize: Receiver<ViewportSize>,
    pub(crate) stop: Receiver<()>,
}

//=== StopHandle ==========================================================

/// External stop signal for the render loop.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop: Sender<()>,
}

impl StopHandle {
    /// Asks the render loop to stop. Repeated calls are harmless.
    pub fn stop(&self) {
        let _ = self.stop.try_send(());
    }
}

//=== Construction ========================================================

/// Creates the control channels.
pub fn render_loop_control<W>() -> (ControlSender<W>, ControlReceiver<W>, StopHandle) {
    let (init_tx, init_rx) = bounded(1);
    let (tap_tx, tap_rx) = unbounded();
    let (pause_tx, pause_rx) = unbounded();
    let (resume_tx, resume_rx) = unbounded();
    let (resize_tx, resize_rx) = unbounded();
    let (stop_tx, stop_rx) = bounded(1);

    (
        ControlSender {
            init: init_tx,
            tap: tap_tx,
            pause: pause_tx,
            resume: resume_tx,
            resize: resize_tx,
        },
        ControlReceiver {
            init: init_rx,
            tap: tap_rx,
            pause: pause_rx,
            resume: resume_rx,
            resize: resize_rx,
            stop: stop_rx,
        },
        StopHandle { stop: stop_tx },
    )
}

//=========================================================================
// Unit Tests
//=========================================================================
