//=========================================================================
// Software Rasterizer
//=========================================================================
//
// Draws filled rotated rectangles and line segments into a tightly
// packed RGBA8 frame (row 0 = top of the screen).
//
// World coordinates are y-up; `to_row` performs the flip.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;

//=== Internal Dependencies ===============================================

use super::Color;

//=== Frame ===============================================================

/// Mutable view over an RGBA8 frame.
pub struct Frame<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Frame<'a> {
    /// Wraps `pixels`, which must hold `width * height * 4` bytes.
    ///
    /// # Panics
    ///
    /// Panics if the slice length does not match the dimensions.
    pub fn new(pixels: &'a mut [u8], width: u32, height: u32) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "Frame size mismatch"
        );
        Self { pixels, width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    //--- Primitives -------------------------------------------------------

    pub fn clear(&mut self, color: Color) {
        let rgba = [color.r, color.g, color.b, color.a];
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Writes one pixel at world coordinates (ignored when off-frame).
    pub fn put(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let row = self.to_row(y as u32);
        let idx = (row as usize * self.width as usize + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
    }

    /// Reads one pixel at world coordinates.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let row = self.to_row(y);
        let idx = (row as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[idx..idx + 4];
        Some(Color { r: p[0], g: p[1], b: p[2], a: p[3] })
    }

    /// Fills a rotated rectangle.
    ///
    /// A pixel is covered when its centre lies inside the rectangle.
    pub fn fill_box(&mut self, center: Vec2, size: Vec2, angle: f32, color: Color) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        let half = size * 0.5;
        let rot = Vec2::from_angle(angle);
        let unrot = Vec2::from_angle(-angle);

        // Bounding box of the rotated corners
        let corners = [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ]
        .map(|c| center + rot.rotate(c));

        let (mut min, mut max) = (corners[0], corners[0]);
        for c in &corners[1..] {
            min = min.min(*c);
            max = max.max(*c);
        }

        let x0 = (min.x.floor() as i64).max(0);
        let y0 = (min.y.floor() as i64).max(0);
        let x1 = (max.x.ceil() as i64).min(self.width as i64 - 1);
        let y1 = (max.y.ceil() as i64).min(self.height as i64 - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                let local = unrot.rotate(p);
                if local.x.abs() <= half.x && local.y.abs() <= half.y {
                    self.put(x, y, color);
                }
            }
        }
    }

    /// Draws a segment with a simple DDA walk.
    pub fn draw_segment(&mut self, from: Vec2, to: Vec2, color: Color) {
        let delta = to - from;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as usize;
        let inc = delta / steps as f32;

        let mut p = from;
        for _ in 0..=steps {
            self.put(p.x.floor() as i64, p.y.floor() as i64, color);
            p += inc;
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn to_row(&self, y: u32) -> u32 {
        self.height - 1 - y
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    fn buffer(w: u32, h: u32) -> Vec<u8> {
        vec![0; (w * h * 4) as usize]
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut buf = buffer(4, 3);
        let mut frame = Frame::new(&mut buf, 4, 3);
        frame.clear(Color::WHITE);
        assert!(buf.iter().all(|b| *b == 255));
    }

    #[test]
    #[should_panic(expected = "Frame size mismatch")]
    fn new_rejects_wrong_length() {
        let mut buf = vec![0; 10];
        Frame::new(&mut buf, 4, 4);
    }

    #[test]
    fn put_flips_y_axis() {
        let mut buf = buffer(2, 2);
        let mut frame = Frame::new(&mut buf, 2, 2);
        frame.put(0, 0, RED);
        // World (0, 0) is the bottom-left pixel, i.e. row 1 in memory
        assert_eq!(&buf[8..12], &[255, 0, 0, 255]);
    }

    #[test]
    fn put_ignores_off_frame() {
        let mut buf = buffer(2, 2);
        let mut frame = Frame::new(&mut buf, 2, 2);
        frame.put(-1, 0, RED);
        frame.put(0, 5, RED);
        assert!(buf.iter().all(|b| *b == 0));
    }

    #[test]
    fn axis_aligned_box_covers_its_area() {
        let mut buf = buffer(10, 10);
        let mut frame = Frame::new(&mut buf, 10, 10);
        frame.fill_box(Vec2::new(5.0, 5.0), Vec2::new(4.0, 2.0), 0.0, RED);

        assert_eq!(frame.get(5, 5), Some(RED));
        assert_eq!(frame.get(3, 4), Some(RED));
        assert_eq!(frame.get(6, 5), Some(RED));
        assert_eq!(frame.get(5, 7), Some(Color { r: 0, g: 0, b: 0, a: 0 }));
        assert_eq!(frame.get(1, 5), Some(Color { r: 0, g: 0, b: 0, a: 0 }));
    }

    #[test]
    fn rotated_box_swaps_extent() {
        let mut buf = buffer(20, 20);
        let mut frame = Frame::new(&mut buf, 20, 20);
        frame.fill_box(
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 2.0),
            std::f32::consts::FRAC_PI_2,
            RED,
        );

        // Tall after a quarter turn
        assert_eq!(frame.get(9, 13), Some(RED));
        assert_ne!(frame.get(13, 9), Some(RED));
    }

    #[test]
    fn box_partially_off_frame_is_clipped() {
        let mut buf = buffer(4, 4);
        let mut frame = Frame::new(&mut buf, 4, 4);
        frame.fill_box(Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0), 0.3, RED);
        assert_eq!(frame.get(0, 0), Some(RED));
    }

    #[test]
    fn segment_hits_both_endpoints() {
        let mut buf = buffer(10, 10);
        let mut frame = Frame::new(&mut buf, 10, 10);
        frame.draw_segment(Vec2::new(0.5, 1.5), Vec2::new(8.5, 1.5), Color::WHITE);
        assert_eq!(frame.get(0, 1), Some(Color::WHITE));
        assert_eq!(frame.get(8, 1), Some(Color::WHITE));
        assert_eq!(frame.get(4, 1), Some(Color::WHITE));
    }
}
