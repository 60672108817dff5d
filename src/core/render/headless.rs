//=========================================================================
// Headless Render Target
//=========================================================================
//
// In-memory canvas with no window behind it. Used by tests and by
// embedders that only need the simulation.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;

//=== Internal Dependencies ===============================================

use super::raster::Frame;
use super::{Canvas, Color, RenderError, RenderTarget};

//=== HeadlessTarget ======================================================

/// Fixed-size target whose canvases draw into a `Vec<u8>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessTarget {
    pub width: u32,
    pub height: u32,
}

impl HeadlessTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl RenderTarget for HeadlessTarget {
    type Canvas = HeadlessCanvas;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn create_canvas(&self) -> Result<HeadlessCanvas, RenderError> {
        Ok(HeadlessCanvas::new(self.width, self.height))
    }
}

//=== HeadlessCanvas ======================================================

/// RGBA frame kept in memory; `present` only counts frames.
#[derive(Debug)]
pub struct HeadlessCanvas {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    presented: u64,
}

impl HeadlessCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize * 4],
            width,
            height,
            presented: 0,
        }
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reads a pixel in world coordinates (y up).
    pub fn pixel(&mut self, x: u32, y: u32) -> Option<Color> {
        self.frame().get(x, y)
    }

    fn frame(&mut self) -> Frame<'_> {
        Frame::new(&mut self.pixels, self.width, self.height)
    }
}

impl Canvas for HeadlessCanvas {
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
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * 4];
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.presented += 1;
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
