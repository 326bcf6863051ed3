//! Point colors.

use serde::{Deserialize, Serialize};

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Attach an opacity in `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: alpha.clamp(0.0, 1.0),
        }
    }

    /// Whether the red or green channel exceeds `threshold`.
    ///
    /// Bright points get a glow; the dim background color does not.
    pub fn is_bright(self, threshold: u8) -> bool {
        self.r > threshold || self.g > threshold
    }

    /// Channels as normalized floats.
    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// An RGB color with floating point opacity, as passed to fill calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Straight-alpha floats `[r, g, b, a]`.
    pub fn to_f32(self) -> [f32; 4] {
        let [r, g, b] = self.rgb().to_f32();
        [r, g, b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_checks_red_or_green() {
        let slate = Rgb::new(75, 85, 99);
        let cherry = Rgb::new(222, 49, 99);
        assert!(!slate.is_bright(100));
        assert!(cherry.is_bright(100));
        assert!(Rgb::WHITE.is_bright(100));
        assert!(!Rgb::new(0, 0, 255).is_bright(100));
    }

    #[test]
    fn test_alpha_is_clamped() {
        assert_eq!(Rgb::WHITE.with_alpha(1.7).a, 1.0);
        assert_eq!(Rgb::WHITE.with_alpha(-0.2).a, 0.0);
    }
}
