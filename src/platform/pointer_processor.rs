//=========================================================================
// Pointer Processor
//=========================================================================
//
// Converts Winit mouse and touch events into pointer AppEvents.
//
// Architecture:
//   Winit Events → PointerProcessor → AppEvent (PointerDown / PointerMove)
//
// Stateful position tracking: mouse buttons carry no position in Winit,
// so the last cursor position is cached and applied to button events.
// Only the left button acts as a pointer.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::event::{ElementState, MouseButton, TouchPhase};

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::AppEvent;

//=== PointerProcessor ====================================================

/// Converts Winit pointer input to AppEvents, remembering the cursor.
#[derive(Debug, Default)]
pub(crate) struct PointerProcessor {
    position: (f32, f32),
}

impl PointerProcessor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn position(&self) -> (f32, f32) {
        self.position
    }

    //--- Event Processing -------------------------------------------------

    pub(crate) fn process_cursor_moved<W>(&mut self, x: f32, y: f32) -> AppEvent<W> {
        self.position = (x, y);
        AppEvent::PointerMove { x, y }
    }

    /// Left button press/release at the last cursor position.
    pub(crate) fn process_mouse_button<W>(
        &self,
        button: MouseButton,
        state: ElementState,
    ) -> Option<AppEvent<W>> {
        if button != MouseButton::Left {
            return None;
        }
        let (x, y) = self.position;
        Some(AppEvent::PointerDown {
            x,
            y,
            pressed: state == ElementState::Pressed,
        })
    }

    /// Touches behave like a left button that moves the cursor.
    pub(crate) fn process_touch<W>(&mut self, phase: TouchPhase, x: f32, y: f32) -> AppEvent<W> {
        self.position = (x, y);
        match phase {
            TouchPhase::Started => AppEvent::PointerDown { x, y, pressed: true },
            TouchPhase::Moved => AppEvent::PointerMove { x, y },
            TouchPhase::Ended | TouchPhase::Cancelled => AppEvent::PointerDown { x, y, pressed: false },
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
