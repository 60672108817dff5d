//=========================================================================
// Platform Subsystem
//
// Bridges Winit (OS-level events) with the dispatcher thread.
//
// Architecture:
// ```text
//  Main Thread:                        Dispatcher Thread:
//  ┌─────────────────────────────┐    ┌────────────────────┐
//  │  Winit Event Loop           │    │  Dispatcher        │
//  │   ↓                         │    │   ↓                │
//  │  resumed / suspended        │    │  ControlSender     │
//  │  window_event               │    │   ├─ init          │
//  │   ↓                         │    │   ├─ tap           │
//  │  PointerProcessor           │    │   ├─ pause (ack)   │
//  │   └─ mouse/touch → pointer  │    │   ├─ resume        │
//  │   ↓                         │    │   └─ resize        │
//  │  Channel ───────────────────┼───>│                    │
//  └─────────────────────────────┘    └────────────────────┘
//                AppEvent<WinitTarget>
// ```
//
// Key Design Decisions:
// - **Window per resume**: The window is created on the first `resumed`
//   and re-sent after every later resume, since the render loop only
//   restarts on a new window.
// - **Graceful channel disconnect**: If the dispatcher is gone, the
//   platform logs a warning but keeps running so the window can close.
// - **Main thread requirement**: Winit mandates the main thread on
//   macOS/iOS, so this runs on the thread that called `Engine::run()`.
//
//=========================================================================

//=== Submodules ==========================================================

mod pointer_processor;
mod window_target;

//=== External Crates =====================================================

use std::sync::Arc;

use crossbeam_channel::Sender;
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::config::WindowConfig;
use crate::core::platform_bridge::{AppEvent, PlatformError};
use pointer_processor::PointerProcessor;

pub use window_target::{PixelsCanvas, WinitTarget};

//=== Platform ============================================================

/// Window manager and event source.
///
/// Runs on the main thread and sends [`AppEvent`]s to the dispatcher.
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new(sender, window)`
/// 2. **Execution**: `platform.run()` blocks in the Winit event loop
/// 3. **Shutdown**: Close requested → `Destroy` sent → loop exits
pub(crate) struct Platform {
    /// OS window (None until the first `resumed()`).
    window: Option<Arc<Window>>,

    /// Window title and initial size.
    config: WindowConfig,

    /// Channel to the dispatcher thread.
    event_sender: Sender<AppEvent<WinitTarget>>,

    /// Converts mouse/touch input into pointer events.
    pointer: PointerProcessor,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    /// Does not create the window yet; that happens in `resumed()`.
    pub fn new(event_sender: Sender<AppEvent<WinitTarget>>, config: WindowConfig) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            config,
            event_sender,
            pointer: PointerProcessor::new(),
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the Winit event loop until the window is closed.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop cannot be created or
    /// fails while running.
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new()
            .map_err(|e| PlatformError::EventLoopCreation(e.to_string()))?;

        event_loop
            .run_app(&mut self)
            .map_err(|e| PlatformError::EventLoopExecution(e.to_string()))
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends one event to the dispatcher.
    ///
    /// A disconnected channel is logged and the event dropped, so the
    /// window can still be closed normally.
    fn send(&self, event: AppEvent<WinitTarget>) {
        let kind = event.kind();
        if self.event_sender.send(event).is_err() {
            warn!(target: "platform", "Channel disconnected, dropping {} event", kind);
        }
    }

    fn send_window(&self, window: &Arc<Window>) {
        self.send(AppEvent::WindowCreated {
            window: WinitTarget::new(Arc::clone(window), self.config.title.clone()),
            activity: None,
        });
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) {
        let attrs = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                let window = Arc::new(window);
                self.send_window(&window);
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.send(AppEvent::Destroy);
                event_loop.exit();
            }
        }
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Arc<Window>> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Called on startup and on every return to the foreground.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        match &self.window {
            None => self.create_window(event_loop),
            Some(window) => {
                debug!(target: "platform", "Resumed; re-sending window");
                self.send(AppEvent::Resume);
                self.send_window(window);
            }
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        debug!(target: "platform", "Suspended");
        self.send(AppEvent::Pause);
    }

    /// Handles per-window events.
    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.send(AppEvent::Destroy);
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                trace!(target: "platform", "Resized to {}x{}", size.width, size.height);
                self.send(AppEvent::RedrawNeeded {
                    width: size.width,
                    height: size.height,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                let event = self.pointer.process_cursor_moved(position.x as f32, position.y as f32);
                self.send(event);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(event) = self.pointer.process_mouse_button(button, state) {
                    self.send(event);
                }
            }

            WindowEvent::Touch(touch) => {
                let event = self.pointer.process_touch(
                    touch.phase,
                    touch.location.x as f32,
                    touch.location.y as f32,
                );
                self.send(event);
            }

            _ => {
                // Ignore: RedrawRequested (the render thread presents on its
                // own ticker), Focused, keyboard, etc.
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn platform_creation() {
        let (tx, _rx) = unbounded();
        let platform = Platform::new(tx, WindowConfig::default());
        assert!(platform.window().is_none(), "Window should be created lazily");
    }

    #[test]
    fn send_forwards_events() {
        let (tx, rx) = unbounded();
        let platform = Platform::new(tx, WindowConfig::default());

        platform.send(AppEvent::Pause);
        platform.send(AppEvent::RedrawNeeded { width: 3, height: 4 });

        assert!(matches!(rx.try_recv(), Ok(AppEvent::Pause)));
        assert!(matches!(
            rx.try_recv(),
            Ok(AppEvent::RedrawNeeded { width: 3, height: 4 })
        ));
    }

    #[test]
    fn send_handles_disconnected_channel() {
        let (tx, rx) = unbounded();
        let platform = Platform::new(tx, WindowConfig::default());
        drop(rx);

        // Should not panic, just log warning
        platform.send(AppEvent::Destroy);
    }
}
