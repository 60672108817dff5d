//=========================================================================
// Event Dispatcher
//=========================================================================
//
// Routes application events to the render loop's control channels.
//
// Architecture:
//   Receiver<AppEvent<W>> → dispatch() → ControlSender<W> → DispatchOutcome
//
// Runs on its own thread. Pause is the only blocking route: the
// dispatcher waits for the render thread to confirm its ticker is
// stopped before taking the next event.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io;
use std::thread;

use crossbeam_channel::Receiver;
use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use super::AppEvent;
use crate::core::render_loop::{ControlClosed, ControlSender, InitRequest, TapEvent, ViewportSize};

//=== DispatchOutcome =====================================================

/// Why the dispatcher stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A `Destroy` event was received.
    Destroyed,

    /// The event source hung up without `Destroy`.
    SourceClosed,
}

//=== Dispatcher ==========================================================

pub struct Dispatcher<W> {
    events: Receiver<AppEvent<W>>,
    control: ControlSender<W>,
    dispatched: u64,
}

impl<W: Send + 'static> Dispatcher<W> {
    pub fn new(events: Receiver<AppEvent<W>>, control: ControlSender<W>) -> Self {
        Self {
            events,
            control,
            dispatched: 0,
        }
    }

    /// Runs the dispatcher on its own named thread.
    pub fn spawn(self) -> io::Result<thread::JoinHandle<DispatchOutcome>> {
        thread::Builder::new()
            .name("boxfall-events".into())
            .spawn(move || self.run())
    }

    /// Blocks on events until `Destroy` or until the source disconnects.
    pub fn run(mut self) -> DispatchOutcome {
        debug!(target: "events", "Dispatcher started");

        let outcome = loop {
            let Ok(event) = self.events.recv() else {
                break DispatchOutcome::SourceClosed;
            };
            if let Some(outcome) = self.dispatch(event) {
                break outcome;
            }
        };

        info!(
            target: "events",
            "Dispatcher stopped ({:?}) after {} events",
            outcome,
            self.dispatched
        );
        outcome
    }

    //--- Routing ----------------------------------------------------------

    /// Routes one event. Returns an outcome when dispatching must end.
    pub(crate) fn dispatch(&mut self, event: AppEvent<W>) -> Option<DispatchOutcome> {
        self.dispatched += 1;
        trace!(target: "events", "Dispatching {}", event.kind());

        let result = match event {
            AppEvent::WindowCreated { window, activity } => {
                debug!(target: "events", "Window created (activity: {:?})", activity);
                self.control.send_init(InitRequest { window, activity })
            }
            AppEvent::PointerDown { x, y, pressed: true } => self.control.send_tap(TapEvent { x, y }),
            AppEvent::PointerDown { x, y, pressed: false } => {
                trace!(target: "events", "Pointer released at ({}, {})", x, y);
                Ok(())
            }
            AppEvent::PointerMove { x, y } => {
                trace!(target: "events", "Pointer moved to ({}, {})", x, y);
                Ok(())
            }
            AppEvent::Pause => {
                debug!(target: "events", "Pausing render loop");
                self.control.pause()
            }
            AppEvent::Resume => {
                debug!(target: "events", "Resuming render loop");
                self.control.send_resume()
            }
            AppEvent::RedrawNeeded { width, height } => {
                self.control.send_resize(ViewportSize { width, height })
            }
            AppEvent::Destroy => return Some(DispatchOutcome::Destroyed),
        };

        if let Err(ControlClosed(channel)) = result {
            warn!(target: "events", "Render loop gone, dropped '{}' message", channel);
        }
        None
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
