//=========================================================================
// Boxfall Library Root
//
// Falling-boxes physics demo driven by a fixed-rate render loop.
//
// Responsibilities:
// - Expose the engine facade (`Engine`, `EngineBuilder`)
// - Expose the platform-independent core for headless use and tests
// - Keep the Winit/pixels integration (`platform`) private
//
// Typical usage:
// ```no_run
// use boxfall::config::AppConfig;
// use boxfall::EngineBuilder;
//
// fn main() {
//     EngineBuilder::new(AppConfig::default()).build().run();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------

pub mod config;
pub mod core;
pub mod logging;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` owns the window and the Winit event loop.
// `engine` wires the threads together.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
pub use platform::{PixelsCanvas, WinitTarget};
