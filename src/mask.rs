//! Logo text mask.
//!
//! The logo is drawn once into an offscreen RGBA raster. Each text segment
//! is painted in a color that identifies its tone, so sampling one pixel
//! tells both "is this inside a glyph" (alpha) and "which group of glyphs"
//! (red channel for accent segments, blue/green for primary ones).

use cosmic_text::{Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache, Weight};
use tracing::debug;

use crate::config::{GlyphTone, TextConfig, TextSegment};
use crate::error::RasterError;

/// Paint colors per tone. Primary segments alternate between blue and green
/// so neighbours stay distinguishable; accent segments are always red.
const ACCENT_PAINT: [u8; 3] = [255, 0, 0];
const PRIMARY_PAINTS: [[u8; 3]; 2] = [[0, 0, 255], [0, 128, 0]];

/// Line box height relative to the font size.
const LINE_HEIGHT: f32 = 1.2;

/// What a sample of the mask hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskHit {
    /// Outside every glyph.
    Empty,
    /// Inside a glyph of the given tone.
    Glyph(GlyphTone),
}

/// An RGBA8 raster of the logo.
#[derive(Debug, Clone)]
pub struct TextMask {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    alpha_threshold: u8,
    channel_threshold: u8,
}

impl TextMask {
    /// A fully transparent mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            alpha_threshold: 128,
            channel_threshold: 128,
        }
    }

    pub fn with_thresholds(mut self, alpha: u8, channel: u8) -> Self {
        self.alpha_threshold = alpha;
        self.channel_threshold = channel;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Source-over blend of `paint` at coverage `alpha` into one pixel.
    /// Out-of-bounds writes are ignored.
    pub fn blend(&mut self, x: i32, y: i32, paint: [u8; 3], alpha: u8) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 || alpha == 0 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let a = alpha as f32 / 255.0;
        for c in 0..3 {
            let dst = self.pixels[i + c] as f32;
            self.pixels[i + c] = (paint[c] as f32 * a + dst * (1.0 - a)).round() as u8;
        }
        let dst_a = self.pixels[i + 3] as f32 / 255.0;
        self.pixels[i + 3] = ((a + dst_a * (1.0 - a)) * 255.0).round() as u8;
    }

    /// Fill a rectangle with a solid paint. Handy for building masks by hand.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, paint: [u8; 3]) {
        for py in y..(y + h).min(self.height) {
            for px in x..(x + w).min(self.width) {
                self.blend(px as i32, py as i32, paint, 255);
            }
        }
    }

    /// Classify the pixel at normalized `(u, v)` in `[0, 1]`.
    pub fn sample(&self, u: f32, v: f32) -> MaskHit {
        if self.width == 0 || self.height == 0 {
            return MaskHit::Empty;
        }
        let x = ((u * self.width as f32).floor().max(0.0) as u32).min(self.width - 1);
        let y = ((v * self.height as f32).floor().max(0.0) as u32).min(self.height - 1);
        let [r, _, _, a] = self.pixel(x, y);

        if a <= self.alpha_threshold {
            MaskHit::Empty
        } else if r > self.channel_threshold {
            MaskHit::Glyph(GlyphTone::Accent)
        } else {
            MaskHit::Glyph(GlyphTone::Primary)
        }
    }
}

/// The paint used for the `index`-th segment.
pub fn segment_paint(segments: &[TextSegment], index: usize) -> [u8; 3] {
    match segments[index].tone {
        GlyphTone::Accent => ACCENT_PAINT,
        GlyphTone::Primary => {
            let nth = segments[..index]
                .iter()
                .filter(|s| s.tone == GlyphTone::Primary)
                .count();
            PRIMARY_PAINTS[nth % PRIMARY_PAINTS.len()]
        }
    }
}

/// Something that can measure and rasterize text.
pub trait GlyphRasterizer {
    /// Advance width of `text` at `font_size` pixels.
    fn measure(&mut self, text: &str, font_size: f32) -> Result<f32, RasterError>;

    /// Draw `text` with its horizontal centre at `center_x` and its vertical
    /// middle at `middle_y`.
    fn fill_text(
        &mut self,
        mask: &mut TextMask,
        text: &str,
        font_size: f32,
        center_x: f32,
        middle_y: f32,
        paint: [u8; 3],
    ) -> Result<(), RasterError>;
}

/// Lay out the segments side by side, centred, and rasterize them.
pub fn build_text_mask(
    rasterizer: &mut dyn GlyphRasterizer,
    config: &TextConfig,
) -> Result<TextMask, RasterError> {
    if config.raster_width == 0 || config.raster_height == 0 {
        return Err(RasterError::EmptyRaster {
            width: config.raster_width,
            height: config.raster_height,
        });
    }

    let mut mask = TextMask::new(config.raster_width, config.raster_height)
        .with_thresholds(config.alpha_threshold, config.channel_threshold);

    let widths = config
        .segments
        .iter()
        .map(|s| rasterizer.measure(&s.text, config.font_size))
        .collect::<Result<Vec<_>, _>>()?;
    let total: f32 = widths.iter().sum();

    let middle_y = config.raster_height as f32 / 2.0;
    let mut x = (config.raster_width as f32 - total) / 2.0;
    for (i, (segment, width)) in config.segments.iter().zip(&widths).enumerate() {
        let paint = segment_paint(&config.segments, i);
        rasterizer.fill_text(
            &mut mask,
            &segment.text,
            config.font_size,
            x + width / 2.0,
            middle_y,
            paint,
        )?;
        x += width;
    }

    debug!(
        width = config.raster_width,
        height = config.raster_height,
        text_width = total,
        "rasterized text mask"
    );
    Ok(mask)
}

/// [`GlyphRasterizer`] backed by `cosmic-text` and system fonts.
pub struct CosmicRasterizer {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl CosmicRasterizer {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    }

    fn shaped(&mut self, text: &str, font_size: f32) -> Buffer {
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics::new(font_size, font_size * LINE_HEIGHT),
        );
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(
            &mut self.font_system,
            text,
            Attrs::new().family(Family::SansSerif).weight(Weight::BOLD),
            Shaping::Advanced,
        );
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    /// Width and top of the first laid-out line.
    fn line_metrics(buffer: &Buffer) -> Option<(f32, f32)> {
        buffer
            .layout_runs()
            .next()
            .map(|run| (run.line_w, run.line_top))
    }
}

impl Default for CosmicRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphRasterizer for CosmicRasterizer {
    fn measure(&mut self, text: &str, font_size: f32) -> Result<f32, RasterError> {
        let buffer = self.shaped(text, font_size);
        Self::line_metrics(&buffer)
            .map(|(w, _)| w)
            .ok_or_else(|| RasterError::NoFont(text.to_string()))
    }

    fn fill_text(
        &mut self,
        mask: &mut TextMask,
        text: &str,
        font_size: f32,
        center_x: f32,
        middle_y: f32,
        paint: [u8; 3],
    ) -> Result<(), RasterError> {
        let buffer = self.shaped(text, font_size);
        let (line_w, line_top) =
            Self::line_metrics(&buffer).ok_or_else(|| RasterError::NoFont(text.to_string()))?;

        let left = (center_x - line_w / 2.0).round() as i32;
        let top = (middle_y - line_top - font_size * LINE_HEIGHT / 2.0).round() as i32;

        let mut drawn = false;
        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            Color::rgb(paint[0], paint[1], paint[2]),
            |x, y, w, h, color| {
                let alpha = color.a();
                if alpha == 0 {
                    return;
                }
                drawn = true;
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        mask.blend(left + x + dx, top + y + dy, paint, alpha);
                    }
                }
            },
        );

        if drawn || text.trim().is_empty() {
            Ok(())
        } else {
            Err(RasterError::NoFont(text.to_string()))
        }
    }
}
