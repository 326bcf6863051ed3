//! Depth-sorted draw pass.
//!
//! Points are painted far to near so nearer points cover farther ones.
//! Depth also drives size and opacity, and bright points get a glow.
//! Drawing goes through [`Canvas2d`], so the same pass feeds the CPU
//! rasterizer, the GPU renderer and test recorders.

use glam::Vec2;

use crate::color::{Rgb, Rgba};
use crate::config::RenderConfig;
use crate::spawn::PointField;

/// The drawing surface the render pass targets.
///
/// Coordinates are logical pixels. Implementations scale by their own
/// device pixel ratio.
pub trait Canvas2d {
    /// Fill the whole surface.
    fn clear(&mut self, color: Rgb);

    /// Blur applied to subsequent fills until [`Canvas2d::clear_shadow`].
    fn set_shadow(&mut self, blur: f32, color: Rgb);

    fn clear_shadow(&mut self);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
}

/// Radius for a point at `depth`: 0.5 at the back, 2.5 at the front.
#[inline]
pub fn point_radius(depth: f32) -> f32 {
    ((depth + 1.5) / 2.5) * 2.0 + 0.5
}

/// Opacity for a point at `depth`: 0.4 at the back, 1.0 at the front.
#[inline]
pub fn point_opacity(depth: f32) -> f32 {
    0.4 + ((depth + 1.0) / 2.0) * 0.6
}

/// Draws a field onto a canvas.
#[derive(Debug)]
pub struct RenderPass {
    config: RenderConfig,
    order: Vec<usize>,
}

impl RenderPass {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            order: Vec::new(),
        }
    }

    /// Indices of the field's points, farthest first.
    pub fn draw_order(&mut self, field: &PointField) -> &[usize] {
        let points = field.points();
        self.order.clear();
        self.order.extend(0..points.len());
        self.order
            .sort_by(|&a, &b| points[a].depth.total_cmp(&points[b].depth));
        &self.order
    }

    /// Clear the canvas and paint every point.
    pub fn draw(&mut self, field: &PointField, canvas: &mut dyn Canvas2d) {
        canvas.clear(self.config.clear_color);
        self.draw_order(field);

        let points = field.points();
        let threshold = self.config.glow_threshold;
        for &i in &self.order {
            let p = &points[i];
            let glows = p.color.is_bright(threshold);
            if glows {
                canvas.set_shadow(self.config.glow_blur, p.color);
            }
            canvas.fill_circle(
                p.position,
                point_radius(p.depth),
                p.color.with_alpha(point_opacity(p.depth)),
            );
            if glows {
                canvas.clear_shadow();
            }
        }
    }
}
