//=========================================================================
// Core Systems
//
// Platform-independent pieces of the demo.
//
// Layout:
// ```text
//   platform_bridge   AppEvent stream → Dispatcher → render loop controls
//   render_loop       fixed-rate controller, game state, control channels
//   world             boxes + ground over a physics space, scene loading
//   physics           opaque 2-D rigid body space
//   render            canvas / render target seam, software raster
//   audio             one-shot sound playback seam
//   assets            read-only asset server thread
// ```
//
// Nothing in here touches Winit directly; the window arrives as a generic
// `RenderTarget` through `AppEvent::WindowCreated`.
//
//=========================================================================

pub mod assets;
pub mod audio;
pub mod physics;
pub mod platform_bridge;
pub mod render;
pub mod render_loop;
pub mod world;
