//=========================================================================
// Window Target
//=========================================================================
//
// Winit window as a render target, drawn through `pixels`.
//
// Architecture:
//   WinitTarget(Arc<Window>)   created on the main thread, sent in
//        │                     AppEvent::WindowCreated
//        │ create_canvas()     on the render thread
//        ▼
//   PixelsCanvas ── raster::Frame over Pixels::frame_mut() ── render()
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use glam::Vec2;
use log::debug;
use pixels::{Pixels, SurfaceTexture};
use winit::window::Window;

//=== Internal Dependencies ===============================================

use crate::core::render::raster::Frame;
use crate::core::render::{Canvas, Color, RenderError, RenderTarget};

//=== WinitTarget =========================================================

/// Shared handle to the application window.
#[derive(Debug, Clone)]
pub struct WinitTarget {
    window: Arc<Window>,
    title: String,
}

impl WinitTarget {
    pub(crate) fn new(window: Arc<Window>, title: impl Into<String>) -> Self {
        Self {
            window,
            title: title.into(),
        }
    }
}

impl RenderTarget for WinitTarget {
    type Canvas = PixelsCanvas;

    fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn create_canvas(&self) -> Result<PixelsCanvas, RenderError> {
        let (width, height) = self.size();
        let (width, height) = (width.max(1), height.max(1));

        let surface = SurfaceTexture::new(width, height, Arc::clone(&self.window));
        let pixels = Pixels::new(width, height, surface)
            .map_err(|e| RenderError::SurfaceCreation(e.to_string()))?;

        debug!(target: "render", "Pixel surface created: {}x{}", width, height);
        Ok(PixelsCanvas { pixels, width, height })
    }

    fn show_fps(&self, fps: u32) {
        self.window.set_title(&format!("{} - {} fps", self.title, fps));
    }
}

//=== PixelsCanvas ========================================================

/// GPU-presented RGBA frame. Lives on the render thread.
pub struct PixelsCanvas {
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl PixelsCanvas {
    fn frame(&mut self) -> Frame<'_> {
        Frame::new(self.pixels.frame_mut(), self.width, self.height)
    }
}

impl Canvas for PixelsCanvas {
    fn clear(&mut self, color: Color) {
        self.frame().clear(color);
    }

    fn fill_box(&mut self, center: Vec2, size: Vec2, angle: f32, color: Color) {
        self.frame().fill_box(center, size, angle, color);
    }

    fn draw_segment(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.frame().draw_segment(from, to, color);
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        let (width, height) = (width.max(1), height.max(1));
        self.pixels
            .resize_surface(width, height)
            .map_err(|e| RenderError::Resize(e.to_string()))?;
        self.pixels
            .resize_buffer(width, height)
            .map_err(|e| RenderError::Resize(e.to_string()))?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.pixels
            .render()
            .map_err(|e| RenderError::Present(e.to_string()))
    }
}
