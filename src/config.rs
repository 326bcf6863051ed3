//! Intro configuration.
//!
//! Every value is fixed at initialization time. The defaults reproduce the
//! stock intro; a TOML file may override any subset of fields, e.g.
//!
//! ```toml
//! [timeline]
//! spin_duration = 4.0
//!
//! [forces]
//! rigidity = 0.6
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::color::Rgb;
use crate::error::ConfigError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    pub field: FieldConfig,
    pub text: TextConfig,
    pub palette: PaletteConfig,
    pub forces: ForceConfig,
    pub motion: MotionConfig,
    pub timeline: TimelineConfig,
    pub render: RenderConfig,
    pub session: SessionConfig,
}

/// Point field layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub point_count: u32,
    /// Sphere radius as a fraction of `min(width, height)`.
    pub scale_factor: f32,
    /// Downward shift of the sphere centre in logical pixels.
    pub vertical_offset: f32,
    /// Seed for the background speckle and per-point responsiveness.
    /// `None` draws a fresh seed from the OS.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            point_count: 15_000,
            scale_factor: 0.225,
            vertical_offset: 38.0,
            seed: None,
        }
    }
}

/// How a text segment is painted into the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphTone {
    Primary,
    Accent,
}

/// One run of logo text with a single tone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSegment {
    pub text: String,
    pub tone: GlyphTone,
}

impl TextSegment {
    pub fn new(text: impl Into<String>, tone: GlyphTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// Logo text mask settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub segments: Vec<TextSegment>,
    pub font_size: f32,
    pub raster_width: u32,
    pub raster_height: u32,
    /// Height of the latitude band carrying the text, as a fraction of the sphere.
    pub band_height: f32,
    pub alpha_threshold: u8,
    pub channel_threshold: u8,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            segments: vec![
                TextSegment::new("afr", GlyphTone::Primary),
                TextSegment::new("AI", GlyphTone::Accent),
                TextSegment::new("ca", GlyphTone::Primary),
            ],
            font_size: 150.0,
            raster_width: 1024,
            raster_height: 256,
            band_height: 0.4,
            alpha_threshold: 128,
            channel_threshold: 128,
        }
    }
}

/// Point colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub text_primary: Rgb,
    pub text_accent: Rgb,
    pub background: Rgb,
    /// Rare background color scattered over the sphere.
    pub speckle: Rgb,
    /// Probability that a background point takes the speckle color.
    pub speckle_ratio: f32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            text_primary: Rgb::WHITE,
            text_accent: Rgb::new(222, 49, 99),
            background: Rgb::new(75, 85, 99),
            speckle: Rgb::new(222, 49, 99),
            speckle_ratio: 0.15,
        }
    }
}

/// Force model constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// 1.0 snaps points to the sphere; below 1.0 enables pointer repulsion
    /// and spring return.
    pub rigidity: f32,
    pub friction: f32,
    pub mouse_radius: f32,
    pub repulsion_strength: f32,
    pub restore_strength: f32,
    pub explosion_force: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            rigidity: 1.0,
            friction: 0.94,
            mouse_radius: 120.0,
            repulsion_strength: 6.0,
            restore_strength: 0.4,
            explosion_force: 15.0,
        }
    }
}

/// Rotation behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Radians added to the target Y rotation per frame while spinning.
    pub spin_step: f32,
    pub smoothing: f32,
    pub momentum_decay: f32,
    /// Radians per pixel of pointer drag.
    pub drag_sensitivity: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            spin_step: 0.05,
            smoothing: 0.05,
            momentum_decay: 0.95,
            drag_sensitivity: 0.01,
        }
    }
}

/// Phase durations in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub spin_duration: f64,
    pub explosion_duration: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            spin_duration: 8.0,
            explosion_duration: 2.0,
        }
    }
}

/// Draw settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub glow_blur: f32,
    pub glow_threshold: u8,
    pub clear_color: Rgb,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            glow_blur: 15.0,
            glow_threshold: 100,
            clear_color: Rgb::BLACK,
        }
    }
}

/// Completion outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub flag_key: String,
    pub next_view: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            flag_key: "afraica-loaded".into(),
            next_view: "./main.html".into(),
        }
    }
}

impl IntroConfig {
    /// Load and validate a TOML config file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: IntroConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.forces;
        if !(0.0..=1.0).contains(&f.rigidity) {
            return invalid(format!("forces.rigidity must be in [0, 1], got {}", f.rigidity));
        }
        if !(f.friction > 0.0 && f.friction <= 1.0) {
            return invalid(format!("forces.friction must be in (0, 1], got {}", f.friction));
        }
        if f.mouse_radius <= 0.0 {
            return invalid("forces.mouse_radius must be positive".into());
        }
        if self.field.scale_factor <= 0.0 {
            return invalid("field.scale_factor must be positive".into());
        }

        let t = &self.text;
        if t.segments.is_empty() {
            return invalid("text.segments must not be empty".into());
        }
        if t.raster_width == 0 || t.raster_height == 0 {
            return invalid("text raster size must be non-zero".into());
        }
        if t.font_size <= 0.0 {
            return invalid("text.font_size must be positive".into());
        }
        if !(t.band_height > 0.0 && t.band_height <= 1.0) {
            return invalid(format!("text.band_height must be in (0, 1], got {}", t.band_height));
        }

        if !(0.0..=1.0).contains(&self.palette.speckle_ratio) {
            return invalid("palette.speckle_ratio must be in [0, 1]".into());
        }

        let m = &self.motion;
        if !(m.smoothing > 0.0 && m.smoothing <= 1.0) {
            return invalid("motion.smoothing must be in (0, 1]".into());
        }
        if !(0.0..=1.0).contains(&m.momentum_decay) {
            return invalid("motion.momentum_decay must be in [0, 1]".into());
        }

        let tl = &self.timeline;
        if tl.spin_duration < 0.0 || tl.explosion_duration < 0.0 {
            return invalid("timeline durations must not be negative".into());
        }
        if !tl.spin_duration.is_finite() || !tl.explosion_duration.is_finite() {
            return invalid("timeline durations must be finite".into());
        }

        Ok(())
    }
}

fn invalid(msg: String) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(msg))
}
