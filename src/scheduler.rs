//! The animation loop.
//!
//! There is exactly one loop, owned by [`Scheduler`]. The host asks for
//! frames on its own schedule (vsync, a fixed-step headless driver, a test)
//! and calls [`Scheduler::frame`] with the [`FrameTicket`] it was given.
//! Host callbacks never touch simulation state directly: pointer events go
//! into an inbox that the loop drains at the start of each frame.
//!
//! Cancellation is by generation. Every [`Scheduler::restart`] bumps the
//! generation, so a ticket handed out before the restart is refused even if
//! the host delivers it late.

use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info};

use crate::input::{PointerEvent, SurfaceGeometry};
use crate::phase::Phase;
use crate::projection::Viewport;
use crate::render::Canvas2d;
use crate::session::Completion;
use crate::simulation::{Simulation, StepOutcome};
use crate::time::{Clock, FrameTimer};

/// Permission to run one frame of one loop generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameTicket {
    generation: u64,
    serial: u64,
}

impl FrameTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The host side of the loop: something that can call back for a frame.
pub trait FrameHost {
    /// Arrange for [`Scheduler::frame`] to be called with `ticket`.
    fn request_frame(&mut self, ticket: FrameTicket);

    /// Drop a request made earlier, if it has not run yet.
    fn cancel_frame(&mut self, ticket: FrameTicket);
}

/// What [`Scheduler::frame`] did with a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was drawn and the next one requested.
    Rendered,
    /// The ticket belonged to a cancelled generation or was already used.
    Stale,
    /// The intro finished on this frame. Completion outputs have run.
    Completed,
    /// The loop had already stopped.
    Stopped,
}

pub struct Scheduler<C: Clock> {
    simulation: Simulation,
    clock: C,
    completion: Completion,
    inbox: Receiver<PointerEvent>,
    sender: Sender<PointerEvent>,
    generation: u64,
    serial: u64,
    pending: Option<FrameTicket>,
    timer: FrameTimer,
    stopped: bool,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(simulation: Simulation, clock: C, completion: Completion) -> Self {
        let (sender, inbox) = mpsc::channel();
        Self {
            simulation,
            clock,
            completion,
            inbox,
            sender,
            generation: 0,
            serial: 0,
            pending: None,
            timer: FrameTimer::new(),
            stopped: false,
        }
    }

    /// A handle for host callbacks to post pointer events.
    pub fn inbox(&self) -> Sender<PointerEvent> {
        self.sender.clone()
    }

    /// Request the first frame.
    pub fn start(&mut self, host: &mut dyn FrameHost) {
        if self.stopped || self.pending.is_some() {
            return;
        }
        info!(
            points = self.simulation.field().len(),
            "starting animation loop"
        );
        self.request(host);
    }

    /// Run the frame `ticket` was issued for.
    pub fn frame(
        &mut self,
        ticket: FrameTicket,
        host: &mut dyn FrameHost,
        canvas: &mut dyn Canvas2d,
    ) -> FrameOutcome {
        if self.stopped {
            return FrameOutcome::Stopped;
        }
        if self.pending != Some(ticket) {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping stale frame"
            );
            return FrameOutcome::Stale;
        }
        self.pending = None;

        while let Ok(event) = self.inbox.try_recv() {
            self.simulation.pointer_event(event);
        }

        let now = self.clock.now();
        if let Some(fps) = self.timer.tick(now) {
            debug!(phase = ?self.simulation.phase(), "{fps:.1} fps");
        }

        match self.simulation.step(now, canvas) {
            StepOutcome::Drawn(_) => {
                self.request(host);
                FrameOutcome::Rendered
            }
            StepOutcome::Completed => {
                self.stopped = true;
                info!(frames = self.timer.frame(), "animation loop finished");
                self.completion.complete();
                FrameOutcome::Completed
            }
            StepOutcome::Finished => {
                self.stopped = true;
                FrameOutcome::Stopped
            }
        }
    }

    /// Cancel the running loop, lay the field out for `viewport` and start a
    /// new loop.
    pub fn restart(&mut self, viewport: Viewport, host: &mut dyn FrameHost) {
        self.cancel(host);
        self.generation += 1;
        if self.stopped {
            return;
        }
        info!(
            width = viewport.width,
            height = viewport.height,
            generation = self.generation,
            "restarting for new viewport"
        );
        self.simulation.regenerate(viewport);
        self.request(host);
    }

    /// Stop for good. No further frames run.
    pub fn shutdown(&mut self, host: &mut dyn FrameHost) {
        self.cancel(host);
        self.generation += 1;
        self.stopped = true;
    }

    pub fn set_geometry(&mut self, geometry: SurfaceGeometry) {
        self.simulation.set_geometry(geometry);
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn phase(&self) -> Phase {
        self.simulation.phase()
    }

    pub fn completion(&self) -> &Completion {
        &self.completion
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn frames(&self) -> u64 {
        self.timer.frame()
    }

    fn cancel(&mut self, host: &mut dyn FrameHost) {
        if let Some(ticket) = self.pending.take() {
            host.cancel_frame(ticket);
        }
    }

    fn request(&mut self, host: &mut dyn FrameHost) {
        self.serial += 1;
        let ticket = FrameTicket {
            generation: self.generation,
            serial: self.serial,
        };
        self.pending = Some(ticket);
        host.request_frame(ticket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntroConfig;
    use crate::mask::tests::BlockRasterizer;
    use crate::render::tests::RecordingCanvas;
    use crate::session::{HandoffNavigator, MemorySessionStore};
    use crate::time::ManualClock;
    use glam::Vec2;

    #[derive(Default)]
    struct QueueHost {
        queued: Vec<FrameTicket>,
        cancelled: Vec<FrameTicket>,
    }

    impl FrameHost for QueueHost {
        fn request_frame(&mut self, ticket: FrameTicket) {
            self.queued.push(ticket);
        }
        fn cancel_frame(&mut self, ticket: FrameTicket) {
            self.cancelled.push(ticket);
            self.queued.retain(|t| *t != ticket);
        }
    }

    fn scheduler(clock: ManualClock) -> Scheduler<ManualClock> {
        let mut config = IntroConfig::default();
        config.field.point_count = 500;
        config.field.seed = Some(1);
        config.timeline.spin_duration = 1.0;
        config.timeline.explosion_duration = 0.5;
        let completion = Completion::new(
            &config.session,
            Box::new(MemorySessionStore::new()),
            Box::new(HandoffNavigator::new()),
        );
        let sim = Simulation::new(
            config,
            Viewport::new(800.0, 600.0),
            Box::new(BlockRasterizer { advance: 40.0 }),
        );
        Scheduler::new(sim, clock, completion)
    }

    #[test]
    fn test_runs_to_completion() {
        let clock = ManualClock::new();
        let mut s = scheduler(clock.clone());
        let mut host = QueueHost::default();
        let mut canvas = RecordingCanvas::default();
        s.start(&mut host);

        let mut last = FrameOutcome::Rendered;
        while let Some(ticket) = host.queued.pop() {
            last = s.frame(ticket, &mut host, &mut canvas);
            clock.advance_secs(1.0 / 60.0);
        }
        assert_eq!(last, FrameOutcome::Completed);
        assert!(s.is_stopped());
        assert!(s.completion().is_done());
        assert!(clock.elapsed().as_secs_f64() >= 1.5);
    }

    #[test]
    fn test_stale_ticket_after_restart_is_refused() {
        let clock = ManualClock::new();
        let mut s = scheduler(clock.clone());
        let mut host = QueueHost::default();
        let mut canvas = RecordingCanvas::default();
        s.start(&mut host);
        let old = host.queued[0];

        s.restart(Viewport::new(640.0, 480.0), &mut host);
        assert_eq!(host.cancelled, vec![old]);
        assert_eq!(host.queued.len(), 1);
        assert_eq!(s.simulation().field().len(), 500);

        assert_eq!(s.frame(old, &mut host, &mut canvas), FrameOutcome::Stale);
        assert!(canvas.ops.is_empty());

        let fresh = host.queued.remove(0);
        assert_eq!(s.frame(fresh, &mut host, &mut canvas), FrameOutcome::Rendered);
        // Reusing a consumed ticket is also refused.
        assert_eq!(s.frame(fresh, &mut host, &mut canvas), FrameOutcome::Stale);
    }

    #[test]
    fn test_inbox_is_drained_at_frame_start() {
        let clock = ManualClock::new();
        let mut s = scheduler(clock);
        let mut host = QueueHost::default();
        let mut canvas = RecordingCanvas::default();
        let inbox = s.inbox();
        s.start(&mut host);

        inbox.send(PointerEvent::Down(Vec2::new(10.0, 10.0))).unwrap();
        assert!(!s.simulation().is_dragging());

        let ticket = host.queued.pop().unwrap();
        s.frame(ticket, &mut host, &mut canvas);
        assert!(s.simulation().is_dragging());
    }

    #[test]
    fn test_shutdown_stops_everything() {
        let clock = ManualClock::new();
        let mut s = scheduler(clock);
        let mut host = QueueHost::default();
        let mut canvas = RecordingCanvas::default();
        s.start(&mut host);
        let ticket = host.queued[0];
        s.shutdown(&mut host);
        assert!(host.queued.is_empty());
        assert_eq!(s.frame(ticket, &mut host, &mut canvas), FrameOutcome::Stopped);

        s.restart(Viewport::new(100.0, 100.0), &mut host);
        assert!(host.queued.is_empty());
    }
}
