//! Per-point forces.
//!
//! Each frame, after projection has refreshed `screen_base`, exactly one
//! force mode applies to the whole field:
//!
//! - [`ForceMode::Rigid`]: points sit exactly on the projected sphere.
//! - [`ForceMode::Exploding`]: a radial kick away from the sphere centre,
//!   every frame, with nothing pulling points back.
//! - [`ForceMode::Interactive`]: pointer repulsion plus a spring back to
//!   the sphere.
//!
//! Friction and integration run afterwards for every non-rigid mode.

use glam::Vec2;

use crate::config::ForceConfig;
use crate::phase::Phase;
use crate::spawn::PointField;

/// Which force law the current frame uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForceMode {
    Rigid,
    Exploding { center: Vec2 },
    Interactive,
}

impl ForceMode {
    /// Pick the mode for a frame.
    ///
    /// `center` is the explosion origin, the same point the sphere is
    /// projected around.
    pub fn select(phase: Phase, rigidity: f32, center: Vec2) -> Self {
        match phase {
            Phase::Spinning if rigidity >= 1.0 => ForceMode::Rigid,
            Phase::Exploding => ForceMode::Exploding { center },
            _ => ForceMode::Interactive,
        }
    }
}

/// Applies one frame of forces to a field.
#[derive(Debug, Clone)]
pub struct ForceSolver {
    config: ForceConfig,
}

impl ForceSolver {
    pub fn new(config: ForceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// Advance every point by one frame.
    ///
    /// `pointer` is the canvas-space pointer position, `None` when the
    /// pointer is outside the surface.
    pub fn step(&self, field: &mut PointField, mode: ForceMode, pointer: Option<Vec2>) {
        let c = &self.config;

        if mode == ForceMode::Rigid {
            for p in field.points_mut() {
                p.position = p.screen_base;
                p.velocity = Vec2::ZERO;
            }
            return;
        }

        for p in field.points_mut() {
            match mode {
                ForceMode::Exploding { center } => {
                    let away = p.position - center;
                    let distance = away.length();
                    if distance > 0.0 {
                        p.velocity += away / distance * c.explosion_force;
                    }
                }
                ForceMode::Interactive => {
                    let near = pointer.and_then(|at| {
                        let offset = at - p.position;
                        let distance = offset.length();
                        (distance < c.mouse_radius).then_some((offset, distance))
                    });
                    match near {
                        Some((offset, distance)) => {
                            // Coincident with the pointer: no direction to push in.
                            if distance > 0.0 {
                                let falloff = (c.mouse_radius - distance) / c.mouse_radius;
                                p.velocity -= offset / distance
                                    * falloff
                                    * c.repulsion_strength
                                    * p.responsiveness;
                            }
                        }
                        None if c.rigidity > 0.0 => {
                            p.velocity +=
                                (p.screen_base - p.position) * c.rigidity * c.restore_strength;
                        }
                        None => {}
                    }
                }
                ForceMode::Rigid => {}
            }

            if c.rigidity > 0.0 {
                p.velocity *= c.friction;
            }
            p.position += p.velocity;
        }
    }
}
