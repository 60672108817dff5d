//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the platform layer (winit) with the render loop.
//
// This module defines the contract between platform implementations and
// core logic, so the event source can be swapped (or replaced by a test
// driver) without touching the render loop.
//
// Components:
// - `interface`: Event types and error definitions (the contract)
// - `dispatcher`: Core-side routing of events to render loop controls
//
//=========================================================================

//=== Module Declarations =================================================

mod dispatcher;
mod interface;

//=== Public API ==========================================================

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use interface::{ActivityHandle, AppEvent, PlatformError};
