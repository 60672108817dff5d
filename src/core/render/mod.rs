//=========================================================================
// Render Collaborator
//=========================================================================
//
// Narrow drawing interface consumed by the world and the render loop.
//
// Architecture:
//   RenderTarget (window handle, Send)
//        │  create_canvas()   ← always called on the render thread
//        ▼
//   Canvas (thread-affine) ── clear / fill_box / draw_segment / present
//
// World space has its origin at the bottom-left corner with y pointing
// up, matching an orthographic projection of (0, width, 0, height).
//
//=========================================================================

//=== Module Declarations =================================================

mod headless;
pub mod raster;

//=== External Dependencies ===============================================

use glam::Vec2;
use rand::Rng;

//=== Public API ==========================================================

pub use headless::{HeadlessCanvas, HeadlessTarget};

//=== Color ===============================================================

/// RGBA color with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Random saturated, reasonably bright color.
    ///
    /// Hue is uniform, saturation in `[0.7, 1.0)`, value in `[0.6, 0.9)`.
    pub fn happy() -> Self {
        let mut rng = rand::thread_rng();
        Self::from_hsv(
            rng.gen_range(0.0..360.0),
            rng.gen_range(0.7..1.0),
            rng.gen_range(0.6..0.9),
        )
    }

    /// Converts HSV (hue in degrees, saturation/value in `[0, 1]`) to RGB.
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = value * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = value - c;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let to_u8 = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(to_u8(r), to_u8(g), to_u8(b))
    }
}

//=== RenderError =========================================================

/// Drawing and presentation failures.
///
/// All of these are fatal for the render loop.
#[derive(Debug)]
pub enum RenderError {
    /// The drawing surface could not be created for the window.
    SurfaceCreation(String),

    /// The surface could not be resized.
    Resize(String),

    /// Presenting the frame (swap buffers) failed.
    Present(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SurfaceCreation(e) => write!(f, "Surface creation failed: {}", e),
            Self::Resize(e) => write!(f, "Surface resize failed: {}", e),
            Self::Present(e) => write!(f, "Frame presentation failed: {}", e),
        }
    }
}

impl std::error::Error for RenderError {}

//=== Canvas ==============================================================

/// Thread-affine drawing surface.
///
/// Created by [`RenderTarget::create_canvas`] on the render thread and
/// never moved off it.
pub trait Canvas {
    /// Fills the whole frame with `color`.
    fn clear(&mut self, color: Color);

    /// Fills a rectangle of `size` centred at `center`, rotated by `angle`
    /// radians counter-clockwise.
    fn fill_box(&mut self, center: Vec2, size: Vec2, angle: f32, color: Color);

    /// Draws a one pixel wide line segment.
    fn draw_segment(&mut self, from: Vec2, to: Vec2, color: Color);

    /// Resizes the backing frame and surface.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError>;

    /// Presents the frame (swap buffers).
    fn present(&mut self) -> Result<(), RenderError>;
}

//=== RenderTarget ========================================================

/// Window handle handed from the event source to the render loop.
///
/// The handle itself crosses threads; the canvas it creates does not.
pub trait RenderTarget: Send + 'static {
    type Canvas: Canvas;

    /// Current drawable size in pixels.
    fn size(&self) -> (u32, u32);

    /// Creates the drawing surface. Must be called on the render thread.
    fn create_canvas(&self) -> Result<Self::Canvas, RenderError>;

    /// Reports the sampled frames-per-second value. Default: no-op.
    fn show_fps(&self, _fps: u32) {}
}

//=========================================================================
// Unit Tests
//=========================================================================
