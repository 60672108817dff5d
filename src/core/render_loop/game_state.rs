//=========================================================================
// Game State
//=========================================================================
//
// Everything the render thread owns while a window is live. Created on
// init, dropped on pause (after the world is destroyed) or replaced by
// the next init.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::ActivityHandle;
use crate::core::render::{Canvas, RenderError, RenderTarget};
use crate::core::world::{Viewport, World};

//=== GameState ===========================================================

pub struct GameState<W: RenderTarget> {
    pub(crate) window: W,
    pub(crate) activity: Option<ActivityHandle>,
    pub(crate) canvas: W::Canvas,
    pub(crate) world: World,

    /// Frames rendered since creation. Never reset.
    pub(crate) frames: u64,

    /// Frames rendered since the last FPS sample.
    pub(crate) frames_this_second: u32,

    /// Last sampled FPS value.
    pub(crate) fps: u32,
}

impl<W: RenderTarget> GameState<W> {
    pub fn new(window: W, activity: Option<ActivityHandle>, canvas: W::Canvas, world: World) -> Self {
        Self {
            window,
            activity,
            canvas,
            world,
            frames: 0,
            frames_this_second: 0,
            fps: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn activity(&self) -> Option<ActivityHandle> {
        self.activity
    }

    pub fn viewport(&self) -> Viewport {
        self.world.viewport()
    }

    //--- Frame ------------------------------------------------------------

    /// Steps the world by `dt`, draws it and presents the canvas.
    ///
    /// Returns the number of boxes culled this frame.
    pub(crate) fn render_frame(&mut self, dt: f32) -> Result<usize, RenderError> {
        self.frames += 1;
        self.frames_this_second += 1;

        self.world.step(dt);
        let culled = self.world.draw(&mut self.canvas);
        self.canvas.present()?;
        Ok(culled)
    }

    /// Samples and resets the per-second counter.
    pub(crate) fn sample_fps(&mut self) -> u32 {
        self.fps = self.frames_this_second;
        self.frames_this_second = 0;
        self.window.show_fps(self.fps);
        self.fps
    }

    /// Resizes the canvas and the world's viewport.
    pub(crate) fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        self.canvas.resize(viewport.width, viewport.height)?;
        self.world.set_viewport(viewport);
        Ok(())
    }

    /// Releases audio and removes every body before dropping.
    pub(crate) fn release(mut self) {
        self.world.destroy();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
