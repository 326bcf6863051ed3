//! Intro timeline.
//!
//! ```text
//! Spinning --(spin_duration)--> Exploding --(explosion_duration)--> Complete
//! ```
//!
//! Transitions only move forward. The spin timer starts on the first frame
//! rather than at construction, so a slow setup does not eat into it.

use std::time::{Duration, Instant};

use tracing::info;

use crate::config::TimelineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Spinning,
    Exploding,
    Complete,
}

/// A transition that happened during [`PhaseController::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    ExplosionStarted,
    Completed,
}

#[derive(Debug, Clone)]
pub struct PhaseController {
    phase: Phase,
    spin_duration: Duration,
    explosion_duration: Duration,
    started_at: Option<Instant>,
    explosion_at: Option<Instant>,
}

impl PhaseController {
    pub fn new(timeline: &TimelineConfig) -> Self {
        Self {
            phase: Phase::Spinning,
            spin_duration: seconds(timeline.spin_duration),
            explosion_duration: seconds(timeline.explosion_duration),
            started_at: None,
            explosion_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// When the explosion began, if it has.
    pub fn explosion_started_at(&self) -> Option<Instant> {
        self.explosion_at
    }

    /// Move the timeline to `now`.
    ///
    /// At most one event is reported per call. When the spin ends and the
    /// explosion has zero length, the call reports [`PhaseEvent::Completed`]
    /// directly.
    pub fn advance(&mut self, now: Instant) -> Option<PhaseEvent> {
        let started = *self.started_at.get_or_insert(now);
        let mut event = None;

        if self.phase == Phase::Spinning
            && now.saturating_duration_since(started) >= self.spin_duration
        {
            self.phase = Phase::Exploding;
            self.explosion_at = Some(now);
            info!("spin finished, exploding");
            event = Some(PhaseEvent::ExplosionStarted);
        }

        if self.phase == Phase::Exploding {
            let since = self.explosion_at.unwrap_or(now);
            if now.saturating_duration_since(since) >= self.explosion_duration {
                self.phase = Phase::Complete;
                info!("intro complete");
                event = Some(PhaseEvent::Completed);
            }
        }

        event
    }
}

/// Durations too long for a [`Duration`] saturate; they never end in practice.
fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{Clock, ManualClock};

    fn controller(spin: f64, explode: f64) -> PhaseController {
        PhaseController::new(&TimelineConfig {
            spin_duration: spin,
            explosion_duration: explode,
        })
    }

    #[test]
    fn test_starts_spinning() {
        let c = controller(8.0, 2.0);
        assert_eq!(c.phase(), Phase::Spinning);
        assert!(c.explosion_started_at().is_none());
    }

    #[test]
    fn test_timer_starts_on_first_advance() {
        let clock = ManualClock::new();
        let mut c = controller(1.0, 1.0);
        // Setup delay before the first frame does not count.
        clock.advance_secs(5.0);
        assert_eq!(c.advance(clock.now()), None);
        clock.advance_secs(0.9);
        assert_eq!(c.advance(clock.now()), None);
        clock.advance_secs(0.1);
        assert_eq!(c.advance(clock.now()), Some(PhaseEvent::ExplosionStarted));
    }

    #[test]
    fn test_full_timeline() {
        let clock = ManualClock::new();
        let mut c = controller(8.0, 2.0);
        let mut events = Vec::new();
        for _ in 0..(12 * 60) {
            if let Some(e) = c.advance(clock.now()) {
                events.push((e, clock.elapsed()));
            }
            clock.advance_secs(1.0 / 60.0);
        }
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, PhaseEvent::ExplosionStarted);
        assert_eq!(events[1].0, PhaseEvent::Completed);
        let explode_at = events[0].1.as_secs_f64();
        let done_at = events[1].1.as_secs_f64();
        assert!((8.0..8.05).contains(&explode_at), "{explode_at}");
        assert!((10.0..10.05).contains(&done_at), "{done_at}");
        assert!(c.is_complete());
    }

    #[test]
    fn test_complete_is_terminal() {
        let clock = ManualClock::new();
        let mut c = controller(0.5, 0.5);
        c.advance(clock.now());
        clock.advance_secs(0.5);
        c.advance(clock.now());
        clock.advance_secs(0.5);
        assert_eq!(c.advance(clock.now()), Some(PhaseEvent::Completed));
        for _ in 0..10 {
            clock.advance_secs(1.0);
            assert_eq!(c.advance(clock.now()), None);
            assert_eq!(c.phase(), Phase::Complete);
        }
    }

    #[test]
    fn test_zero_explosion_completes_in_same_call() {
        let clock = ManualClock::new();
        let mut c = controller(1.0, 0.0);
        c.advance(clock.now());
        clock.advance_secs(1.0);
        assert_eq!(c.advance(clock.now()), Some(PhaseEvent::Completed));
        assert!(c.explosion_started_at().is_some());
    }

    #[test]
    fn test_long_stall_jumps_one_phase_at_a_time_per_duration() {
        let clock = ManualClock::new();
        let mut c = controller(1.0, 1.0);
        c.advance(clock.now());
        // One huge frame gap: the explosion starts now, and still has to run.
        clock.advance_secs(30.0);
        assert_eq!(c.advance(clock.now()), Some(PhaseEvent::ExplosionStarted));
        assert_eq!(c.phase(), Phase::Exploding);
    }

    #[test]
    fn test_huge_spin_duration_saturates() {
        let config = crate::IntroConfig::from_toml("[timeline]\nspin_duration = 1e20\n").unwrap();
        let clock = ManualClock::new();
        let mut c = PhaseController::new(&config.timeline);
        c.advance(clock.now());
        clock.advance_secs(1.0e6);
        assert_eq!(c.advance(clock.now()), None);
        assert_eq!(c.phase(), Phase::Spinning);
    }
}
