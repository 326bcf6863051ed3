//! Time facilities for the intro timeline.
//!
//! Phase durations are measured in wall-clock time so the intro lasts the
//! same regardless of frame rate. The [`Clock`] trait is the single source
//! of "now"; [`SystemClock`] reads `std::time::Instant`, while
//! [`ManualClock`] is advanced explicitly for headless runs and tests.
//!
//! # Example
//!
//! ```
//! use particle_globe::time::{Clock, ManualClock};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_millis(16));
//! assert_eq!(clock.now() - start, Duration::from_millis(16));
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic clock.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Real time from the OS monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the scheduler.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    /// Move time forward by fractional seconds.
    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs.max(0.0)));
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

/// Frame counting and FPS measurement.
///
/// Fed the same instants the simulation sees, so it agrees with the
/// timeline under a [`ManualClock`].
#[derive(Debug)]
pub struct FrameTimer {
    /// When the last frame occurred.
    last_frame: Option<Instant>,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Option<Instant>,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last_frame: None,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: None,
            fps_update_interval: Duration::from_secs(1),
        }
    }

    /// Record a frame at `now`.
    ///
    /// Returns `Some(fps)` whenever a new FPS figure is available.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        self.delta_secs = self
            .last_frame
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        self.frame_count += 1;

        let since = *self.fps_update_time.get_or_insert(now);
        let fps_elapsed = now.saturating_duration_since(since);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = Some(now);
            return Some(self.fps);
        }
        None
    }

    /// Time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames recorded.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Most recent FPS figure.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Forget all history, e.g. after a restart.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shares_time_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let start = clock.now();

        handle.advance_secs(1.5);
        assert_eq!(clock.now() - start, Duration::from_millis(1500));
        assert_eq!(clock.elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn test_frame_timer_counts_frames() {
        let clock = ManualClock::new();
        let mut timer = FrameTimer::new();
        assert_eq!(timer.frame(), 0);

        timer.tick(clock.now());
        clock.advance(Duration::from_millis(20));
        timer.tick(clock.now());

        assert_eq!(timer.frame(), 2);
        assert!((timer.delta() - 0.020).abs() < 1e-4);
    }

    #[test]
    fn test_frame_timer_reports_fps_once_per_interval() {
        let clock = ManualClock::new();
        let mut timer = FrameTimer::new();

        let mut reports = Vec::new();
        for _ in 0..90 {
            if let Some(fps) = timer.tick(clock.now()) {
                reports.push(fps);
            }
            clock.advance_secs(1.0 / 60.0);
        }

        assert_eq!(reports.len(), 1);
        assert!((reports[0] - 60.0).abs() < 2.0);
    }

    #[test]
    fn test_frame_timer_reset() {
        let clock = ManualClock::new();
        let mut timer = FrameTimer::new();
        timer.tick(clock.now());
        timer.reset();
        assert_eq!(timer.frame(), 0);
        assert_eq!(timer.delta(), 0.0);
    }
}
