//! Simulation context.
//!
//! [`Simulation`] owns everything that changes from frame to frame: the
//! point field, rotation, pointer, phase and projection. Each subsystem is
//! called with a borrow of just the pieces it needs, in a fixed order:
//!
//! 1. phase advance (and automatic spin while spinning)
//! 2. rotation easing
//! 3. projection of every point
//! 4. forces
//! 5. depth-sorted draw

use std::time::Instant;

use glam::Vec2;
use rand::rngs::SmallRng;

use crate::config::IntroConfig;
use crate::forces::{ForceMode, ForceSolver};
use crate::input::{InputAdapter, PointerEvent, SurfaceGeometry};
use crate::mask::GlyphRasterizer;
use crate::phase::{Phase, PhaseController, PhaseEvent};
use crate::projection::{Projection, RotationState, Viewport};
use crate::render::{Canvas2d, RenderPass};
use crate::spawn::{field_rng, PointField};

/// What one call to [`Simulation::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A frame was drawn. Carries the transition, if one happened.
    Drawn(Option<PhaseEvent>),
    /// The intro finished during this step. Nothing was drawn.
    Completed,
    /// Already complete before this step.
    Finished,
}

pub struct Simulation {
    config: IntroConfig,
    viewport: Viewport,
    geometry: SurfaceGeometry,
    projection: Projection,
    field: PointField,
    rotation: RotationState,
    input: InputAdapter,
    phase: PhaseController,
    forces: ForceSolver,
    render: RenderPass,
    rasterizer: Box<dyn GlyphRasterizer>,
    rng: SmallRng,
}

impl Simulation {
    /// Build the context and generate the first point field.
    pub fn new(
        config: IntroConfig,
        viewport: Viewport,
        rasterizer: Box<dyn GlyphRasterizer>,
    ) -> Self {
        let rng = field_rng(config.field.seed);
        let mut sim = Self {
            viewport,
            geometry: SurfaceGeometry::unscaled(Vec2::new(viewport.width, viewport.height)),
            projection: Projection::new(viewport, &config.field),
            field: PointField::default(),
            rotation: RotationState::default(),
            input: InputAdapter::new(config.motion.drag_sensitivity),
            phase: PhaseController::new(&config.timeline),
            forces: ForceSolver::new(config.forces.clone()),
            render: RenderPass::new(config.render.clone()),
            rasterizer,
            rng,
            config,
        };
        sim.regenerate(viewport);
        sim
    }

    /// Replace the point field with one laid out for `viewport`.
    ///
    /// Phase, rotation and pointer carry over; only the points are new.
    pub fn regenerate(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.projection = Projection::new(viewport, &self.config.field);
        self.field = PointField::generate(
            &self.config,
            viewport,
            self.rasterizer.as_mut(),
            &mut self.rng,
        );
    }

    /// Where the canvas sits, for mapping pointer positions.
    pub fn set_geometry(&mut self, geometry: SurfaceGeometry) {
        self.geometry = geometry;
    }

    pub fn pointer_event(&mut self, event: PointerEvent) {
        self.input.apply(event, &self.geometry, &mut self.rotation);
    }

    /// Run one frame at `now`, drawing onto `canvas`.
    pub fn step(&mut self, now: Instant, canvas: &mut dyn Canvas2d) -> StepOutcome {
        if self.phase.is_complete() {
            return StepOutcome::Finished;
        }

        let event = self.phase.advance(now);
        let phase = self.phase.phase();
        if phase == Phase::Spinning {
            self.rotation.spin(self.config.motion.spin_step);
        }
        if phase == Phase::Complete {
            return StepOutcome::Completed;
        }

        let free_to_settle = !self.input.is_dragging() && phase != Phase::Spinning;
        self.rotation.update(&self.config.motion, free_to_settle);

        self.projection.project(self.rotation.current, &mut self.field);
        let mode = ForceMode::select(phase, self.config.forces.rigidity, self.projection.center);
        self.forces.step(&mut self.field, mode, self.input.pointer());

        self.render.draw(&self.field, canvas);
        StepOutcome::Drawn(event)
    }

    pub fn phase(&self) -> Phase {
        self.phase.phase()
    }

    pub fn field(&self) -> &PointField {
        &self.field
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn config(&self) -> &IntroConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        self.input.is_dragging()
    }
}
