//! # Particle Globe
//!
//! A loading intro: a sphere of glowing points spins for a while with a logo
//! picked out in its colours, bursts outward, and then hands off to the next
//! view.
//!
//! ## Quick Start
//!
//! ```ignore
//! use particle_globe::prelude::*;
//!
//! let config = IntroConfig::default();
//! let viewport = Viewport::new(1280.0, 720.0);
//! let simulation = Simulation::new(config.clone(), viewport, Box::new(CosmicRasterizer::new()));
//! let completion = Completion::new(
//!     &config.session,
//!     Box::new(MemorySessionStore::new()),
//!     Box::new(HandoffNavigator::new()),
//! );
//! let scheduler = Scheduler::new(simulation, SystemClock, completion);
//! IntroApp::new(scheduler, "Loading").run()?;
//! ```
//!
//! ## Core Concepts
//!
//! ### Point field
//!
//! Points sit on a golden-angle spiral over the unit sphere
//! ([`spawn::PointField`]). Points that fall inside a band around the
//! equator take their colour from a rasterized text mask
//! ([`mask::TextMask`]); the rest get the background palette.
//!
//! ### Frame
//!
//! Every frame runs the same order: phase advance, rotation easing,
//! projection, forces, depth-sorted draw. [`simulation::Simulation`] owns all
//! of it. [`scheduler::Scheduler`] owns the single loop that calls it, and
//! drains pointer events from an inbox before each frame.
//!
//! ### Phases
//!
//! The intro spins for a fixed time, explodes for a fixed time, then
//! completes ([`phase::Phase`]). Completion writes a session flag and
//! navigates once ([`session::Completion`]).
//!
//! ### Canvases
//!
//! Drawing goes through the small [`render::Canvas2d`] trait. The window uses
//! [`gpu::GpuCanvas`]; headless runs and tests use [`raster::PixelCanvas`].

pub mod color;
pub mod config;
pub mod error;
pub mod forces;
pub mod gpu;
pub mod headless;
pub mod input;
pub mod mask;
pub mod phase;
pub mod projection;
pub mod raster;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod shader;
pub mod simulation;
pub mod spawn;
pub mod time;
pub mod window;

pub use glam::{Vec2, Vec3};
pub use config::IntroConfig;
pub use error::IntroError;
pub use scheduler::Scheduler;
pub use simulation::Simulation;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use particle_globe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::{Rgb, Rgba};
    pub use crate::config::{GlyphTone, IntroConfig, TextSegment};
    pub use crate::error::IntroError;
    pub use crate::headless::{HeadlessRunner, QueuedFrames};
    pub use crate::input::{PointerEvent, SurfaceGeometry};
    pub use crate::mask::{CosmicRasterizer, GlyphRasterizer};
    pub use crate::phase::Phase;
    pub use crate::projection::Viewport;
    pub use crate::raster::PixelCanvas;
    pub use crate::render::Canvas2d;
    pub use crate::scheduler::{FrameHost, FrameOutcome, FrameTicket, Scheduler};
    pub use crate::session::{
        Completion, FileSessionStore, HandoffNavigator, LogNavigator, MemorySessionStore,
        StoreLocation,
    };
    pub use crate::simulation::Simulation;
    pub use crate::time::{Clock, ManualClock, SystemClock};
    pub use crate::window::IntroApp;
    pub use crate::{Vec2, Vec3};
}
