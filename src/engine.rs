//=========================================================================
// Boxfall Engine
//
// Main entry point and supervisor for the demo.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()──>  [Runtime]
//         │                          │
//         ├─ with_scene_setup()      ├─ spawns asset server
//         └─ with_channel_capacity() ├─ spawns render + dispatcher threads
//                                    ├─ runs platform (main thread)
//                                    └─ joins everything on exit
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::process;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info, warn};

//=== Internal Dependencies ===============================================

use crate::config::AppConfig;
use crate::core::assets::spawn_asset_server;
use crate::core::platform_bridge::{AppEvent, Dispatcher};
use crate::core::render_loop::{render_loop_control, RenderController, RenderLoopConfig};
use crate::core::world::{SceneLoader, SceneSetup};
use crate::platform::{Platform, WinitTarget};

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Scene setup**: [`SceneLoader`] over the configured scene and sounds
/// - **Channel capacity**: 128 events
///
/// # Examples
///
/// ```no_run
/// use boxfall::config::AppConfig;
/// use boxfall::EngineBuilder;
///
/// EngineBuilder::new(AppConfig::default()).build().run();
/// ```
///
/// Custom scene:
/// ```no_run
/// use boxfall::config::AppConfig;
/// use boxfall::core::world::World;
/// use boxfall::EngineBuilder;
///
/// EngineBuilder::new(AppConfig::default())
///     .with_scene_setup(Box::new(|viewport| {
///         let mut world = World::new(viewport);
///         world.populate_random(20);
///         Ok(world)
///     }))
///     .build()
///     .run();
/// ```
pub struct EngineBuilder {
    config: AppConfig,
    scene_setup: Option<SceneSetup>,
    channel_capacity: usize,
}

impl EngineBuilder {
    /// Creates a new builder around a resolved configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            scene_setup: None,
            channel_capacity: 128,
        }
    }

    /// Replaces the default asset-backed scene loader.
    pub fn with_scene_setup(mut self, setup: SceneSetup) -> Self {
        self.scene_setup = Some(setup);
        self
    }

    /// Sets the capacity of the platform → dispatcher channel.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Builds the engine instance.
    ///
    /// # Panics
    ///
    /// Panics if the configured frame rate is zero.
    pub fn build(self) -> Engine {
        assert!(
            self.config.frames_per_second > 0,
            "Frames per second must be positive, got {}",
            self.config.frames_per_second
        );

        info!(
            "Building engine ({} fps, scene: {}, tap: {:?}, channel: {})",
            self.config.frames_per_second,
            self.config.scene,
            self.config.tap,
            self.channel_capacity
        );

        Engine {
            loop_config: RenderLoopConfig {
                frames_per_second: self.config.frames_per_second,
                tap_action: self.config.tap,
                release_on_pause: self.config.release_on_pause,
            },
            config: self.config,
            scene_setup: self.scene_setup,
            channel_capacity: self.channel_capacity,
        }
    }
}

//=== Engine ==============================================================

/// Boxfall runtime.
///
/// # Architecture
///
/// ```text
/// Engine (Main Thread)
///   ├─► RenderController (boxfall-render @ fps)
///   │     └─► GameState: canvas, World
///   ├─► Dispatcher (boxfall-events)
///   │     └─► AppEvent → render loop controls
///   ├─► Asset server (boxfall-assets)
///   │
///   └─► Platform (Event Loop)
///         └─► Window, pointer input, lifecycle
/// ```
pub struct Engine {
    config: AppConfig,
    loop_config: RenderLoopConfig,
    scene_setup: Option<SceneSetup>,
    channel_capacity: usize,
}

impl Engine {
    /// Starts the runtime and blocks until the window is closed.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the event channel and render loop controls
    /// 2. Spawns the render and dispatcher threads
    /// 3. Runs the platform event loop (blocks here)
    /// 4. On exit: joins the dispatcher, stops and joins the render thread
    ///
    /// Any render loop failure is fatal: it is logged and the process
    /// exits with status 1.
    pub fn run(self) {
        info!("Starting engine runtime ({} fps)", self.loop_config.frames_per_second);

        //--- 1. Create communication channels ----------------------------
        let (tx, rx): (Sender<AppEvent<WinitTarget>>, Receiver<AppEvent<WinitTarget>>) =
            bounded(self.channel_capacity);
        let (control_tx, control_rx, stop) = render_loop_control::<WinitTarget>();

        //--- 2. Spawn the render and dispatcher threads -------------------
        let setup = match self.scene_setup {
            Some(setup) => setup,
            None => match spawn_asset_server(self.config.assets.root.clone()) {
                Ok((assets, _asset_handle)) => {
                    SceneLoader::new(self.config.scene.clone(), self.config.sounds.clone(), assets).into_setup()
                }
                Err(e) => fatal(&format!("Failed to spawn asset server: {}", e)),
            },
        };

        let render_handle = match RenderController::spawn(self.loop_config, setup, control_rx) {
            Ok(handle) => handle,
            Err(e) => fatal(&e.to_string()),
        };

        let dispatcher_handle = match Dispatcher::new(rx, control_tx).spawn() {
            Ok(handle) => handle,
            Err(e) => fatal(&format!("Failed to spawn dispatcher: {}", e)),
        };
        info!("Render and dispatcher threads spawned");

        //--- 3. Launch the platform subsystem -----------------------------
        let platform = Platform::new(tx, self.config.window.clone());
        info!("Platform initialized, entering event loop");

        if let Err(e) = platform.run() {
            error!("Platform error: {}", e);
        }

        info!("Platform event loop exited");

        //--- 4. Cleanup ---------------------------------------------------
        match dispatcher_handle.join() {
            Ok(outcome) => info!("Dispatcher finished: {:?}", outcome),
            Err(e) => error!("Dispatcher thread panicked: {:?}", e),
        }

        stop.stop();

        match render_handle.join() {
            Ok(Ok(summary)) => {
                info!(
                    "Render thread terminated cleanly ({} frames, {} sessions)",
                    summary.frames, summary.sessions
                );
            }
            Ok(Err(e)) => fatal(&e.to_string()),
            Err(e) => {
                warn!("Render thread panicked: {:?}", e);
                process::exit(1);
            }
        }

        info!("Engine shutdown complete");
    }
}

/// Logs a diagnostic and terminates the process.
fn fatal(message: &str) -> ! {
    error!("Fatal: {}", message);
    process::exit(1)
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TapAction;
    use crate::core::world::World;

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::new(AppConfig::default());
        assert_eq!(builder.channel_capacity, 128);
        assert!(builder.scene_setup.is_none());
    }

    #[test]
    fn builder_with_scene_setup() {
        let builder = EngineBuilder::new(AppConfig::default())
            .with_scene_setup(Box::new(|viewport| Ok(World::new(viewport))));
        assert!(builder.scene_setup.is_some());
    }

    #[test]
    fn builder_with_channel_capacity() {
        let builder = EngineBuilder::new(AppConfig::default()).with_channel_capacity(256);
        assert_eq!(builder.channel_capacity, 256);
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn builder_with_channel_capacity_panics_on_zero() {
        EngineBuilder::new(AppConfig::default()).with_channel_capacity(0);
    }

    #[test]
    #[should_panic(expected = "Frames per second must be positive")]
    fn build_panics_on_zero_fps() {
        let config = AppConfig {
            frames_per_second: 0,
            ..AppConfig::default()
        };
        EngineBuilder::new(config).build();
    }

    #[test]
    fn build_carries_loop_settings() {
        let config = AppConfig {
            frames_per_second: 60,
            tap: TapAction::Remove,
            release_on_pause: false,
            ..AppConfig::default()
        };
        let engine = EngineBuilder::new(config).build();

        assert_eq!(
            engine.loop_config,
            RenderLoopConfig {
                frames_per_second: 60,
                tap_action: TapAction::Remove,
                release_on_pause: false,
            }
        );
    }
}
