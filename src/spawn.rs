//! Point field generation.
//!
//! Points are laid out on the unit sphere with the golden-angle spiral, which
//! is deterministic and close to uniform. Color is the only random part:
//! points that land on the logo take a text color, the rest are speckled
//! between two background colors.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::color::Rgb;
use crate::config::{GlyphTone, IntroConfig, PaletteConfig, TextConfig};
use crate::mask::{build_text_mask, GlyphRasterizer, MaskHit, TextMask};
use crate::projection::{rotate_yx, Projection, Viewport};

/// Angle between successive spiral points, `π(3 - √5)`.
pub fn golden_angle() -> f32 {
    PI * (3.0 - 5.0_f32.sqrt())
}

/// Auxiliary rotation that lines sphere longitude up with the mask's u axis.
const TEXT_MAP_ROTATION: Vec2 = Vec2::new(0.0, -PI / 2.0);

/// Fixed orientation baked into every base position so the logo faces the
/// viewer, right side up, at rotation (0, 0).
const FRONT_FACING_ROTATION: Vec2 = Vec2::new(PI, PI);

/// Range of the per-point responsiveness factor.
const RESPONSIVENESS: std::ops::Range<f32> = 10.0..30.0;

/// One simulated point.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Unit-sphere position, fixed after generation.
    pub base: Vec3,
    /// Where the rigid sphere puts this point this frame.
    pub screen_base: Vec2,
    /// Where the point is drawn.
    pub position: Vec2,
    pub velocity: Vec2,
    /// Rotated z; larger is nearer.
    pub depth: f32,
    pub color: Rgb,
    /// Scales pointer repulsion.
    pub responsiveness: f32,
}

/// The `index`-th of `count` golden-spiral points on the unit sphere.
pub fn golden_spiral_point(index: u32, count: u32) -> Vec3 {
    let denom = count.saturating_sub(1).max(1) as f32;
    let y = 1.0 - (index as f32 / denom) * 2.0;
    let radius_at_y = (1.0 - y * y).max(0.0).sqrt();
    let theta = index as f32 * golden_angle();
    Vec3::new(theta.cos() * radius_at_y, y, theta.sin() * radius_at_y)
}

/// Maps sphere points into the text mask's latitude band.
#[derive(Debug, Clone, Copy)]
pub struct TextBand {
    start: f32,
    end: f32,
}

impl TextBand {
    /// A band of `height` (fraction of the sphere) centred on the equator.
    pub fn new(height: f32) -> Self {
        Self {
            start: PI * (1.0 - height) / 2.0,
            end: PI * (1.0 + height) / 2.0,
        }
    }

    /// Mask coordinates `(u, v)` for an unrotated sphere point, or `None`
    /// outside the band.
    pub fn uv(&self, sphere: Vec3) -> Option<Vec2> {
        let mapped = rotate_yx(sphere, TEXT_MAP_ROTATION);
        let longitude = mapped.z.atan2(mapped.x);
        let latitude = mapped.y.clamp(-1.0, 1.0).acos();

        if latitude <= self.start || latitude >= self.end {
            return None;
        }
        Some(Vec2::new(
            (longitude + PI) / TAU,
            (latitude - self.start) / (self.end - self.start),
        ))
    }
}

/// Decides point colors.
pub struct Colorizer<'a> {
    mask: Option<&'a TextMask>,
    band: TextBand,
    palette: &'a PaletteConfig,
}

impl<'a> Colorizer<'a> {
    pub fn new(mask: Option<&'a TextMask>, text: &TextConfig, palette: &'a PaletteConfig) -> Self {
        Self {
            mask,
            band: TextBand::new(text.band_height),
            palette,
        }
    }

    /// Which glyph tone, if any, the unrotated sphere point falls on.
    pub fn text_hit(&self, sphere: Vec3) -> MaskHit {
        match (self.mask, self.band.uv(sphere)) {
            (Some(mask), Some(uv)) => mask.sample(uv.x, uv.y),
            _ => MaskHit::Empty,
        }
    }

    pub fn color(&self, sphere: Vec3, rng: &mut impl Rng) -> Rgb {
        self.paint(self.text_hit(sphere), rng)
    }

    fn paint(&self, hit: MaskHit, rng: &mut impl Rng) -> Rgb {
        match hit {
            MaskHit::Glyph(GlyphTone::Accent) => self.palette.text_accent,
            MaskHit::Glyph(GlyphTone::Primary) => self.palette.text_primary,
            MaskHit::Empty => {
                if rng.gen::<f32>() < self.palette.speckle_ratio {
                    self.palette.speckle
                } else {
                    self.palette.background
                }
            }
        }
    }
}

/// The full collection of points.
#[derive(Debug, Default)]
pub struct PointField {
    points: Vec<Point>,
    text_points: usize,
}

impl PointField {
    /// Build a field from a ready-made text mask.
    ///
    /// `mask` is `None` when the logo could not be rasterized; every point
    /// then takes a background color.
    pub fn from_mask(
        config: &IntroConfig,
        viewport: Viewport,
        mask: Option<&TextMask>,
        rng: &mut SmallRng,
    ) -> Self {
        let count = config.field.point_count;
        let projection = Projection::new(viewport, &config.field);
        let colorizer = Colorizer::new(mask, &config.text, &config.palette);

        let mut text_points = 0;
        let points = (0..count)
            .map(|i| {
                let sphere = golden_spiral_point(i, count);
                let hit = colorizer.text_hit(sphere);
                if hit != MaskHit::Empty {
                    text_points += 1;
                }
                let color = colorizer.paint(hit, rng);
                let base = rotate_yx(sphere, FRONT_FACING_ROTATION);
                let screen = projection.to_screen(base);
                Point {
                    base,
                    screen_base: screen,
                    position: screen,
                    velocity: Vec2::ZERO,
                    depth: base.z,
                    color,
                    responsiveness: rng.gen_range(RESPONSIVENESS),
                }
            })
            .collect();

        Self {
            points,
            text_points,
        }
    }

    /// Rasterize the logo and build the field.
    ///
    /// If the rasterizer fails the field comes back empty: the intro keeps
    /// running, it just has nothing to draw.
    pub fn generate(
        config: &IntroConfig,
        viewport: Viewport,
        rasterizer: &mut dyn GlyphRasterizer,
        rng: &mut SmallRng,
    ) -> Self {
        match build_text_mask(rasterizer, &config.text) {
            Ok(mask) => {
                let field = Self::from_mask(config, viewport, Some(&mask), rng);
                info!(
                    points = field.len(),
                    text_points = field.text_points(),
                    width = viewport.width,
                    height = viewport.height,
                    "generated point field"
                );
                field
            }
            Err(e) => {
                warn!("text mask unavailable, point field left empty: {e}");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// How many points landed on a glyph, in either tone.
    pub fn text_points(&self) -> usize {
        self.text_points
    }

    pub fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }

    fn count_colored(&self, colors: &[Rgb]) -> usize {
        self.points
            .iter()
            .filter(|p| colors.contains(&p.color))
            .count()
    }
}

/// RNG for a generation: seeded when configured, otherwise from the OS.
pub fn field_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}
