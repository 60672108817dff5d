//=========================================================================
// Render Loop
//=========================================================================
//
// Fixed-rate rendering on a dedicated thread, driven by control messages
// from the dispatcher.
//
// Components:
// - `control`: hand-off channels (init, tap, pause, resume, resize, stop)
// - `controller`: the select loop and its state machine
// - `game_state`: window, canvas and world owned by the render thread
//
//=========================================================================

//=== Module Declarations =================================================

mod control;
mod controller;
mod game_state;

//=== Public API ==========================================================

pub use control::{
    render_loop_control, ControlClosed, ControlReceiver, ControlSender, InitRequest, PauseRequest,
    StopHandle, TapEvent, ViewportSize,
};
pub use controller::{LoopState, LoopSummary, RenderController, RenderLoopConfig, RenderLoopError};
pub use game_state::GameState;
