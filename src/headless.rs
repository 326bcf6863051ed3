//! Windowless runs.
//!
//! [`HeadlessRunner`] plays the host role for a [`Scheduler`] without a
//! window: it queues frame requests and delivers them at a fixed rate on a
//! [`ManualClock`], drawing into a [`PixelCanvas`].

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{info, warn};

use crate::raster::PixelCanvas;
use crate::scheduler::{FrameHost, FrameOutcome, FrameTicket, Scheduler};
use crate::time::ManualClock;

/// A host that keeps requested frames in order until they are delivered.
#[derive(Debug, Default)]
pub struct QueuedFrames {
    queue: VecDeque<FrameTicket>,
}

impl QueuedFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next ticket to deliver.
    pub fn pop(&mut self) -> Option<FrameTicket> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl FrameHost for QueuedFrames {
    fn request_frame(&mut self, ticket: FrameTicket) {
        self.queue.push_back(ticket);
    }

    fn cancel_frame(&mut self, ticket: FrameTicket) {
        self.queue.retain(|t| *t != ticket);
    }
}

/// Summary of a headless run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub frames: u64,
    pub elapsed: Duration,
    pub completed: bool,
}

pub struct HeadlessRunner {
    scheduler: Scheduler<ManualClock>,
    clock: ManualClock,
    host: QueuedFrames,
    canvas: PixelCanvas,
    frame_interval: Duration,
}

impl HeadlessRunner {
    /// `clock` must be the clock `scheduler` was built with.
    pub fn new(
        scheduler: Scheduler<ManualClock>,
        clock: ManualClock,
        canvas: PixelCanvas,
        fps: f64,
    ) -> Self {
        let fps = if fps > 0.0 { fps } else { 60.0 };
        Self {
            scheduler,
            clock,
            host: QueuedFrames::new(),
            canvas,
            frame_interval: Duration::from_secs_f64(1.0 / fps),
        }
    }

    /// Deliver frames until the loop stops or `limit` of simulated time
    /// passes.
    pub fn run(&mut self, limit: Duration) -> RunReport {
        let start = self.clock.elapsed();
        self.scheduler.start(&mut self.host);

        let mut completed = false;
        while let Some(ticket) = self.host.pop() {
            match self.scheduler.frame(ticket, &mut self.host, &mut self.canvas) {
                FrameOutcome::Completed => {
                    completed = true;
                    break;
                }
                FrameOutcome::Stopped => break,
                FrameOutcome::Rendered | FrameOutcome::Stale => {}
            }
            if self.clock.elapsed() - start >= limit {
                warn!(limit = ?limit, "headless run hit its time limit");
                break;
            }
            self.clock.advance(self.frame_interval);
        }

        let report = RunReport {
            frames: self.scheduler.frames(),
            elapsed: self.clock.elapsed() - start,
            completed,
        };
        info!(
            frames = report.frames,
            completed = report.completed,
            "headless run finished in {:.2}s",
            report.elapsed.as_secs_f64()
        );
        report
    }

    pub fn scheduler(&self) -> &Scheduler<ManualClock> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<ManualClock> {
        &mut self.scheduler
    }

    pub fn host_mut(&mut self) -> &mut QueuedFrames {
        &mut self.host
    }

    /// The last frame drawn.
    pub fn canvas(&self) -> &PixelCanvas {
        &self.canvas
    }

    pub fn into_scheduler(self) -> Scheduler<ManualClock> {
        self.scheduler
    }
}
