//! Windowed host.
//!
//! [`IntroApp`] is the winit application. It owns the scheduler and a
//! [`GpuCanvas`], turns window events into inbox messages and resize
//! restarts, and runs a frame whenever winit delivers the redraw the
//! scheduler asked for.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use glam::Vec2;
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::error::SetupError;
use crate::gpu::GpuCanvas;
use crate::input::{PointerEvent, PointerTranslator, SurfaceGeometry};
use crate::projection::Viewport;
use crate::scheduler::{FrameHost, FrameOutcome, FrameTicket, Scheduler};
use crate::time::Clock;

/// Frame requests become redraw requests on the window.
#[derive(Default)]
struct WindowHost {
    window: Option<Arc<Window>>,
    queued: Option<FrameTicket>,
}

impl FrameHost for WindowHost {
    fn request_frame(&mut self, ticket: FrameTicket) {
        self.queued = Some(ticket);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn cancel_frame(&mut self, ticket: FrameTicket) {
        if self.queued == Some(ticket) {
            self.queued = None;
        }
    }
}

pub struct IntroApp<C: Clock> {
    scheduler: Scheduler<C>,
    host: WindowHost,
    canvas: Option<GpuCanvas>,
    translator: PointerTranslator,
    inbox: Sender<PointerEvent>,
    title: String,
    size: Viewport,
    error: Option<SetupError>,
}

impl<C: Clock> IntroApp<C> {
    pub fn new(scheduler: Scheduler<C>, title: impl Into<String>) -> Self {
        let inbox = scheduler.inbox();
        let size = scheduler.simulation().viewport();
        Self {
            scheduler,
            host: WindowHost::default(),
            canvas: None,
            translator: PointerTranslator::new(),
            inbox,
            title: title.into(),
            size,
            error: None,
        }
    }

    pub fn scheduler(&self) -> &Scheduler<C> {
        &self.scheduler
    }

    /// Open the window and run until the intro completes or the window is
    /// closed.
    pub fn run(mut self) -> Result<Scheduler<C>, SetupError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop.run_app(&mut self)?;
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.scheduler),
        }
    }

    fn setup(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SetupError> {
        let attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.size.width, self.size.height));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let canvas = pollster::block_on(GpuCanvas::new(window.clone()))?;

        self.host.window = Some(window.clone());
        let viewport = canvas.viewport();
        self.canvas = Some(canvas);
        self.scheduler
            .set_geometry(geometry(viewport, window.scale_factor()));

        if viewport == self.scheduler.simulation().viewport() {
            self.scheduler.start(&mut self.host);
        } else {
            self.scheduler.restart(viewport, &mut self.host);
        }
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(ticket), Some(canvas)) = (self.host.queued.take(), self.canvas.as_mut()) else {
            return;
        };

        match self.scheduler.frame(ticket, &mut self.host, canvas) {
            FrameOutcome::Rendered => match canvas.present() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    canvas.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    error!("GPU out of memory");
                    event_loop.exit();
                }
                Err(e) => warn!("render error: {e}"),
            },
            FrameOutcome::Completed | FrameOutcome::Stopped => event_loop.exit(),
            FrameOutcome::Stale => {}
        }
    }
}

fn geometry(viewport: Viewport, scale_factor: f64) -> SurfaceGeometry {
    SurfaceGeometry::window(
        Vec2::new(viewport.width, viewport.height),
        scale_factor as f32,
    )
}

impl<C: Clock> ApplicationHandler for IntroApp<C> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.window.is_some() {
            return;
        }
        if let Err(e) = self.setup(event_loop) {
            error!("setup failed: {e}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("window closed before the intro finished");
                self.scheduler.shutdown(&mut self.host);
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if physical_size.width == 0 || physical_size.height == 0 {
                    return;
                }
                let (Some(canvas), Some(window)) = (self.canvas.as_mut(), self.host.window.as_ref())
                else {
                    return;
                };
                let scale_factor = window.scale_factor();
                canvas.resize(physical_size, scale_factor);
                let viewport = canvas.viewport();
                self.scheduler.set_geometry(geometry(viewport, scale_factor));
                self.scheduler.restart(viewport, &mut self.host);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => {
                let scale_factor = self
                    .host
                    .window
                    .as_ref()
                    .map_or(1.0, |w| w.scale_factor());
                if let Some(pointer) = self.translator.translate(&other, scale_factor) {
                    // Only fails once the scheduler is gone.
                    let _ = self.inbox.send(pointer);
                }
            }
        }
    }
}
