//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use boxfall::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine
pub use crate::engine::{Engine, EngineBuilder};

// Configuration
pub use crate::config::{AppConfig, SceneConfig, TapAction};

// Render loop
pub use crate::core::render_loop::{
    render_loop_control, ControlSender, LoopState, RenderController, RenderLoopConfig,
    StopHandle,
};

// World
pub use crate::core::world::{SceneDescription, SceneError, Viewport, World};

// Collaborators
pub use crate::core::physics::PhysicsSpace;
pub use crate::core::render::{Canvas, Color, RenderTarget};
