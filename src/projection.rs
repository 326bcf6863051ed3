//! Orientation and screen projection.
//!
//! The sphere is never viewed through a camera: each unit-sphere point is
//! rotated about Y, then X, and the rotated `(x, y)` is scaled and
//! translated straight onto the canvas. The rotated `z` is kept as depth
//! for sorting and shading.

use glam::{Vec2, Vec3};

use crate::config::{FieldConfig, MotionConfig};
use crate::spawn::PointField;

/// Logical size of the drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Rotate `v` about the Y axis by `angles.y`, then about X by `angles.x`.
///
/// The order matters: it decides which way the logo tilts while dragging.
#[inline]
pub fn rotate_yx(v: Vec3, angles: Vec2) -> Vec3 {
    let (sin_y, cos_y) = angles.y.sin_cos();
    let (sin_x, cos_x) = angles.x.sin_cos();

    let x1 = v.x * cos_y - v.z * sin_y;
    let z1 = v.x * sin_y + v.z * cos_y;

    let y2 = v.y * cos_x - z1 * sin_x;
    let z2 = v.y * sin_x + z1 * cos_x;

    Vec3::new(x1, y2, z2)
}

/// Affine map from rotated sphere space to canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub scale: f32,
    pub center: Vec2,
}

impl Projection {
    pub fn new(viewport: Viewport, field: &FieldConfig) -> Self {
        Self {
            scale: viewport.width.min(viewport.height) * field.scale_factor,
            center: Vec2::new(
                viewport.width / 2.0,
                viewport.height / 2.0 + field.vertical_offset,
            ),
        }
    }

    /// Drop the z component of a rotated point onto the canvas.
    #[inline]
    pub fn to_screen(&self, rotated: Vec3) -> Vec2 {
        Vec2::new(rotated.x, rotated.y) * self.scale + self.center
    }

    /// Rotate every base position and write `screen_base` and `depth`.
    pub fn project(&self, rotation: Vec2, field: &mut PointField) {
        for point in field.points_mut() {
            let rotated = rotate_yx(point.base, rotation);
            point.screen_base = self.to_screen(rotated);
            point.depth = rotated.z;
        }
    }
}

/// Current and target rotation about X and Y.
///
/// `x` holds the rotation about the X axis, `y` about the Y axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationState {
    pub current: Vec2,
    pub target: Vec2,
}

impl RotationState {
    /// Automatic spin about Y.
    pub fn spin(&mut self, step: f32) {
        self.target.y += step;
    }

    /// Feed a client-space drag delta into the target.
    ///
    /// Horizontal drag turns about Y; vertical drag tilts about X with the
    /// sign flipped so dragging up tips the top away.
    pub fn drag(&mut self, delta: Vec2, sensitivity: f32) {
        self.target.y += delta.x * sensitivity;
        self.target.x -= delta.y * sensitivity;
    }

    /// Exponential ease of `current` toward `target`.
    pub fn ease(&mut self, smoothing: f32) {
        self.current += (self.target - self.current) * smoothing;
    }

    /// Shrink the target toward rest, leaving drag momentum to die out.
    pub fn decay(&mut self, factor: f32) {
        self.target *= factor;
    }

    /// One frame of rotation update after the phase logic has run.
    pub fn update(&mut self, motion: &MotionConfig, free_to_settle: bool) {
        self.ease(motion.smoothing);
        if free_to_settle {
            self.decay(motion.momentum_decay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let v = Vec3::new(0.3, -0.4, 0.5);
        assert!(approx(rotate_yx(v, Vec2::ZERO), v));
    }

    #[test]
    fn test_quarter_turn_about_y() {
        // x' = x cos - z sin: +X goes to (0, 0, 1).
        let v = rotate_yx(Vec3::X, Vec2::new(0.0, FRAC_PI_2));
        assert!(approx(v, Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_y_is_applied_before_x() {
        let angles = Vec2::new(FRAC_PI_2, FRAC_PI_2);
        // +X -> (0,0,1) under Y, then X turns +Z into -Y.
        let v = rotate_yx(Vec3::X, angles);
        assert!(approx(v, Vec3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn test_rotation_preserves_length() {
        let v = Vec3::new(0.6, 0.0, 0.8);
        let r = rotate_yx(v, Vec2::new(1.1, -2.3));
        assert!((r.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_projection_centre_and_scale() {
        let p = Projection::new(Viewport::new(800.0, 600.0), &FieldConfig::default());
        assert!((p.scale - 135.0).abs() < 1e-3);
        assert_eq!(p.center, Vec2::new(400.0, 338.0));
        let screen = p.to_screen(Vec3::new(1.0, -1.0, 0.7));
        assert!((screen - Vec2::new(535.0, 203.0)).length() < 1e-3);
    }

    #[test]
    fn test_ease_and_decay() {
        let mut r = RotationState::default();
        r.target = Vec2::new(1.0, 2.0);
        r.ease(0.05);
        assert!((r.current - Vec2::new(0.05, 0.1)).length() < 1e-6);

        r.decay(0.95);
        assert!((r.target - Vec2::new(0.95, 1.9)).length() < 1e-6);
    }

    #[test]
    fn test_drag_maps_axes() {
        let mut r = RotationState::default();
        r.drag(Vec2::new(10.0, 20.0), 0.01);
        assert!((r.target.y - 0.1).abs() < 1e-6);
        assert!((r.target.x + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_half_turns_flip_the_pole() {
        let v = rotate_yx(Vec3::Y, Vec2::new(PI, PI));
        assert!(approx(v, Vec3::new(0.0, -1.0, 0.0)));
    }
}
