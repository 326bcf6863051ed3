//! CPU canvas.
//!
//! An RGBA8 pixel buffer implementing [`Canvas2d`]. Used for headless runs
//! (render a frame to PNG) and for checking draws in tests without a GPU.

use std::path::Path;

use glam::Vec2;
use image::{ColorType, ImageFormat};

use crate::color::{Rgb, Rgba};
use crate::projection::Viewport;
use crate::render::Canvas2d;

/// Software canvas with a device pixel ratio.
///
/// Logical coordinates are multiplied by the ratio, so a 400x300 viewport
/// at ratio 2 has an 800x600 backing buffer.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    dpr: f32,
    pixels: Vec<u8>,
    shadow: Option<(f32, Rgb)>,
}

impl PixelCanvas {
    pub fn new(viewport: Viewport, dpr: f32) -> Self {
        let dpr = if dpr > 0.0 { dpr } else { 1.0 };
        let width = (viewport.width * dpr).round().max(0.0) as u32;
        let height = (viewport.height * dpr).round().max(0.0) as u32;
        Self {
            width,
            height,
            dpr,
            pixels: vec![0; width as usize * height as usize * 4],
            shadow: None,
        }
    }

    /// Backing size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.dpr
    }

    /// Logical viewport this canvas covers.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width as f32 / self.dpr, self.height as f32 / self.dpr)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA at a physical pixel.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        image::save_buffer_with_format(
            path,
            &self.pixels,
            self.width,
            self.height,
            ColorType::Rgba8,
            ImageFormat::Png,
        )
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Source-over blend of a straight-alpha color into one pixel.
    fn blend(&mut self, x: u32, y: u32, color: [f32; 3], alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let alpha = alpha.min(1.0);
        let i = self.index(x, y);
        for (c, src) in color.iter().enumerate() {
            let dst = self.pixels[i + c] as f32 / 255.0;
            self.pixels[i + c] = ((src * alpha + dst * (1.0 - alpha)) * 255.0).round() as u8;
        }
        let dst_a = self.pixels[i + 3] as f32 / 255.0;
        self.pixels[i + 3] = ((alpha + dst_a * (1.0 - alpha)) * 255.0).round() as u8;
    }

    /// Visit each physical pixel within `reach` of `center`, passing the
    /// distance from the pixel centre.
    fn for_each_near(
        &mut self,
        center: Vec2,
        reach: f32,
        mut f: impl FnMut(&mut Self, u32, u32, f32),
    ) {
        if self.width == 0 || self.height == 0 || center.x + reach < 0.0 || center.y + reach < 0.0 {
            return;
        }
        let x0 = (center.x - reach).floor().max(0.0) as u32;
        let y0 = (center.y - reach).floor().max(0.0) as u32;
        let x1 = ((center.x + reach).ceil().max(0.0) as u32).min(self.width - 1);
        let y1 = ((center.y + reach).ceil().max(0.0) as u32).min(self.height - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center).length();
                if d <= reach {
                    f(self, x, y, d);
                }
            }
        }
    }
}

impl Canvas2d for PixelCanvas {
    fn clear(&mut self, color: Rgb) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, 255]);
        }
    }

    fn set_shadow(&mut self, blur: f32, color: Rgb) {
        self.shadow = (blur > 0.0).then_some((blur, color));
    }

    fn clear_shadow(&mut self) {
        self.shadow = None;
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let center = center * self.dpr;
        let radius = radius * self.dpr;

        // Gaussian halo under the disc, sigma = blur / 2.
        if let Some((blur, shadow)) = self.shadow {
            let sigma = blur * self.dpr / 2.0;
            let rgb = shadow.to_f32();
            self.for_each_near(center, radius + sigma * 3.0, |canvas, x, y, d| {
                let outside = (d - radius).max(0.0);
                let falloff = (-(outside * outside) / (2.0 * sigma * sigma)).exp();
                canvas.blend(x, y, rgb, color.a * falloff * 0.5);
            });
        }

        let rgb = color.rgb().to_f32();
        self.for_each_near(center, radius + 0.5, |canvas, x, y, d| {
            let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
            canvas.blend(x, y, rgb, color.a * coverage);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backing_size_follows_pixel_ratio() {
        let canvas = PixelCanvas::new(Viewport::new(400.0, 300.0), 2.0);
        assert_eq!(canvas.size(), (800, 600));
        assert_eq!(canvas.viewport(), Viewport::new(400.0, 300.0));
        assert_eq!(canvas.pixels().len(), 800 * 600 * 4);
    }

    #[test]
    fn test_clear_fills_opaque() {
        let mut canvas = PixelCanvas::new(Viewport::new(4.0, 4.0), 1.0);
        canvas.clear(Rgb::new(1, 2, 3));
        assert_eq!(canvas.pixel(3, 3), [1, 2, 3, 255]);
    }

    #[test]
    fn test_opaque_circle_covers_centre_only() {
        let mut canvas = PixelCanvas::new(Viewport::new(20.0, 20.0), 1.0);
        canvas.clear(Rgb::BLACK);
        canvas.fill_circle(Vec2::new(10.0, 10.0), 3.0, Rgb::WHITE.with_alpha(1.0));
        assert_eq!(canvas.pixel(10, 10), [255, 255, 255, 255]);
        assert_eq!(canvas.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(canvas.pixel(18, 10), [0, 0, 0, 255]);
    }

    #[test]
    fn test_translucent_circle_blends() {
        let mut canvas = PixelCanvas::new(Viewport::new(10.0, 10.0), 1.0);
        canvas.clear(Rgb::BLACK);
        canvas.fill_circle(Vec2::new(5.0, 5.0), 2.0, Rgb::WHITE.with_alpha(0.5));
        let [r, g, b, a] = canvas.pixel(5, 5);
        assert!((r as i32 - 128).abs() <= 1);
        assert_eq!((r, g), (g, b));
        assert_eq!(a, 255);
    }

    #[test]
    fn test_shadow_glows_beyond_the_disc() {
        let mut plain = PixelCanvas::new(Viewport::new(40.0, 40.0), 1.0);
        plain.clear(Rgb::BLACK);
        plain.fill_circle(Vec2::new(20.0, 20.0), 2.0, Rgb::WHITE.with_alpha(1.0));

        let mut glowing = plain.clone();
        glowing.clear(Rgb::BLACK);
        glowing.set_shadow(15.0, Rgb::WHITE);
        glowing.fill_circle(Vec2::new(20.0, 20.0), 2.0, Rgb::WHITE.with_alpha(1.0));
        glowing.clear_shadow();

        assert_eq!(plain.pixel(27, 20)[0], 0);
        assert!(glowing.pixel(27, 20)[0] > 0);
    }

    #[test]
    fn test_circles_off_canvas_are_ignored() {
        let mut canvas = PixelCanvas::new(Viewport::new(10.0, 10.0), 1.0);
        canvas.clear(Rgb::BLACK);
        canvas.fill_circle(Vec2::new(-50.0, -50.0), 2.0, Rgb::WHITE.with_alpha(1.0));
        canvas.fill_circle(Vec2::new(500.0, 5.0), 2.0, Rgb::WHITE.with_alpha(1.0));
        assert!(canvas.pixels().chunks(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn test_saves_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut canvas = PixelCanvas::new(Viewport::new(8.0, 6.0), 1.0);
        canvas.clear(Rgb::new(9, 9, 9));
        canvas.save_png(&path).unwrap();
        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert_eq!(decoded.get_pixel(0, 0).0, [9, 9, 9, 255]);
    }
}
