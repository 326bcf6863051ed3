//! Error types for particle-globe.
//!
//! Setup errors are fatal and abort before the first frame. Everything that
//! can go wrong once the animation is running (zero-length vectors, a
//! missing font, a failed flag write) is handled in place and logged.

use std::path::PathBuf;

/// Errors that abort setup before any frame is produced.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The drawing surface (window or pixel buffer) could not be obtained.
    #[error("drawing surface not found: {0}")]
    SurfaceNotFound(String),
    /// The surface exists but no drawing context could be created for it.
    #[error("drawing context unavailable: {0}")]
    ContextUnavailable(String),
    /// The host event loop could not be created or failed while running.
    #[error("event loop error: {0}")]
    EventLoop(String),
}

impl From<winit::error::EventLoopError> for SetupError {
    fn from(e: winit::error::EventLoopError) -> Self {
        SetupError::EventLoop(e.to_string())
    }
}

impl From<winit::error::OsError> for SetupError {
    fn from(e: winit::error::OsError) -> Self {
        SetupError::SurfaceNotFound(e.to_string())
    }
}

impl From<wgpu::CreateSurfaceError> for SetupError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        SetupError::ContextUnavailable(e.to_string())
    }
}

impl From<wgpu::RequestDeviceError> for SetupError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        SetupError::ContextUnavailable(e.to_string())
    }
}

/// Errors from rasterizing the logo text mask.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// No usable font was found for the requested text.
    #[error("no font available to rasterize {0:?}")]
    NoFont(String),
    /// The raster has a zero dimension.
    #[error("text raster has zero size ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },
}

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors from the durable session flag store.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Errors from the follow-on navigation call.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("navigation to {target} unavailable: {reason}")]
    Unavailable { target: String, reason: String },
}

/// Top-level error for the binary and the headless runner.
#[derive(Debug, thiserror::Error)]
pub enum IntroError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("failed to write frame image: {0}")]
    Image(#[from] image::ImageError),
}
