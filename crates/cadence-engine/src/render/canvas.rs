use std::sync::Arc;

use super::color::Color;
use super::font::Font;

const DEFAULT_FONT_SIZE: f32 = 14.0;

/// Fixed-size CPU drawable.
///
/// Coordinates are integer pixels with a top-left origin and +Y down. Every
/// operation clips to the canvas; shapes with a non-positive width or height
/// draw nothing.
#[derive(Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    font: Option<Arc<Font>>,
    font_size: f32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK.to_argb(); width as usize * height as usize],
            font: None,
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// Returns `(width, height)` in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed `0xAARRGGBB` pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| Color::from_argb(self.pixels[i]))
    }

    pub fn font(&self) -> Option<&Arc<Font>> {
        self.font.as_ref()
    }

    pub fn set_font(&mut self, font: Option<Arc<Font>>) {
        self.font = font;
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn set_font_size(&mut self, px: f32) {
        self.font_size = px.max(1.0);
    }

    /// Restores per-acquire graphics state: shared font and default size.
    pub(crate) fn reset_graphics(&mut self, font: Option<Arc<Font>>) {
        self.font = font;
        self.font_size = DEFAULT_FONT_SIZE;
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.with_alpha(255).to_argb());
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else {
            return;
        };

        let stride = self.width as usize;
        for row in y0..y1 {
            let line = &mut self.pixels[row * stride + x0..row * stride + x1];
            if color.is_opaque() {
                line.fill(color.to_argb());
            } else {
                for px in line {
                    *px = color.blend_over(*px, 255);
                }
            }
        }
    }

    /// One-pixel outline covering `x..x+w` by `y..y+h`.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.fill_rect(x, y, w, 1, color);
        self.fill_rect(x, y + h - 1, w, 1, color);
        self.fill_rect(x, y + 1, 1, h - 2, color);
        self.fill_rect(x + w - 1, y + 1, 1, h - 2, color);
    }

    /// Fills the ellipse inscribed in the given bounding box.
    pub fn fill_oval(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else {
            return;
        };

        let rx = w as f32 / 2.0;
        let ry = h as f32 / 2.0;
        let cx = x as f32 + rx;
        let cy = y as f32 + ry;

        let stride = self.width as usize;
        for row in y0..y1 {
            let dy = (row as f32 + 0.5 - cy) / ry;
            for col in x0..x1 {
                let dx = (col as f32 + 0.5 - cx) / rx;
                if dx * dx + dy * dy <= 1.0 {
                    let i = row * stride + col;
                    self.pixels[i] = color.blend_over(self.pixels[i], 255);
                }
            }
        }
    }

    /// Draws `text` with its baseline at `y`, starting at `x`.
    ///
    /// Returns the horizontal advance in pixels. Without a font nothing is
    /// drawn and the advance is 0.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Color) -> i32 {
        let Some(font) = self.font.clone() else {
            return 0;
        };

        let mut pen = x as f32;
        for ch in text.chars() {
            let glyph = font.rasterize(ch, self.font_size);
            let left = pen.round() as i32 + glyph.xmin;
            let top = y - glyph.ymin - glyph.height as i32;

            for gy in 0..glyph.height {
                for gx in 0..glyph.width {
                    let coverage = glyph.coverage[gy * glyph.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    if let Some(i) = self.index(left + gx as i32, top + gy as i32) {
                        self.pixels[i] = color.blend_over(self.pixels[i], coverage);
                    }
                }
            }

            pen += glyph.advance;
        }

        (pen - x as f32).round() as i32
    }

    /// Width `draw_text` would advance for `text` at the current size; 0
    /// without a font.
    pub fn text_width(&self, text: &str) -> i32 {
        self.font
            .as_ref()
            .map_or(0, |font| font.measure(text, self.font_size).round() as i32)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Intersects a rect with the canvas; returns `[x0, x1) x [y0, y1)`.
    fn clip(&self, x: i32, y: i32, w: i32, h: i32) -> Option<(usize, usize, usize, usize)> {
        if w <= 0 || h <= 0 {
            return None;
        }

        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + w as i64).min(self.width as i64);
        let y1 = (y as i64 + h as i64).min(self.height as i64);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("font", &self.font.is_some())
            .field("font_size", &self.font_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(canvas: &Canvas, color: Color) -> usize {
        canvas.pixels().iter().filter(|&&p| p == color.to_argb()).count()
    }

    #[test]
    fn new_canvas_is_black() {
        let c = Canvas::new(4, 3);
        assert_eq!(c.size(), (4, 3));
        assert_eq!(count(&c, Color::BLACK), 12);
    }

    #[test]
    fn fill_rect_is_clipped_to_bounds() {
        let mut c = Canvas::new(10, 10);
        c.fill_rect(-5, -5, 8, 8, Color::GREEN);

        assert_eq!(count(&c, Color::GREEN), 9);
        assert_eq!(c.pixel(2, 2), Some(Color::GREEN));
        assert_eq!(c.pixel(3, 3), Some(Color::BLACK));
    }

    #[test]
    fn degenerate_rects_draw_nothing() {
        let mut c = Canvas::new(10, 10);
        c.fill_rect(2, 2, 0, 5, Color::GREEN);
        c.fill_rect(2, 2, 5, -1, Color::GREEN);
        c.fill_rect(20, 20, 5, 5, Color::GREEN);
        c.fill_oval(2, 2, 0, 0, Color::GREEN);

        assert_eq!(count(&c, Color::GREEN), 0);
    }

    #[test]
    fn draw_rect_outlines_only() {
        let mut c = Canvas::new(10, 10);
        c.draw_rect(1, 1, 4, 4, Color::WHITE);

        assert_eq!(count(&c, Color::WHITE), 12);
        assert_eq!(c.pixel(2, 2), Some(Color::BLACK));
        assert_eq!(c.pixel(4, 4), Some(Color::WHITE));
    }

    #[test]
    fn oval_is_inscribed_in_its_box() {
        let mut c = Canvas::new(20, 20);
        c.fill_oval(0, 0, 20, 20, Color::RED);

        assert_eq!(c.pixel(10, 10), Some(Color::RED));
        assert_eq!(c.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(c.pixel(19, 19), Some(Color::BLACK));
        assert_eq!(c.pixel(0, 10), Some(Color::RED));
    }

    #[test]
    fn clear_forces_opaque() {
        let mut c = Canvas::new(2, 2);
        c.clear(Color::RED.with_alpha(10));
        assert_eq!(c.pixel(0, 0), Some(Color::RED));
    }

    #[test]
    fn text_without_font_is_skipped() {
        let mut c = Canvas::new(50, 20);
        assert_eq!(c.draw_text("FPS 60", 2, 15, Color::GREEN), 0);
        assert_eq!(c.text_width("FPS 60"), 0);
        assert_eq!(count(&c, Color::BLACK), 1_000);
    }
}
