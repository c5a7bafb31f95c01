//! Owned, cancellable deadlines. Rescheduling replaces the previous deadline.

use std::time::{Duration, Instant};

/// A one-shot scheduled task handle. At most one deadline is pending; scheduling
/// again cancels the old one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Instant>,
    /// Full length of the current schedule, for progress bars.
    span: Duration,
}

impl Timer {
    pub const fn idle() -> Self {
        Self {
            deadline: None,
            span: Duration::ZERO,
        }
    }

    /// Schedule (or reschedule) to fire `after` from `now`.
    pub fn schedule(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
        self.span = after;
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Time left before firing; zero when elapsed, `None` when idle.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Fraction of the schedule still left, 0.0..=1.0 (0.0 when idle).
    pub fn remaining_ratio(&self, now: Instant) -> f64 {
        match self.remaining(now) {
            Some(left) if !self.span.is_zero() => {
                (left.as_secs_f64() / self.span.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// True exactly once when the deadline has passed; the timer goes idle.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Push a pending deadline back (used when the game is paused).
    pub fn shift(&mut self, by: Duration) {
        if let Some(d) = self.deadline.as_mut() {
            *d += by;
        }
    }
}

/// Fixed-interval tick. Keeps its phase: late polls catch up one interval at a time.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period: Duration,
    next: Instant,
}

impl Interval {
    pub fn new(now: Instant, period: Duration) -> Self {
        Self {
            period,
            next: now + period,
        }
    }

    /// Number of whole periods elapsed since the last poll.
    pub fn poll(&mut self, now: Instant) -> u32 {
        if self.period.is_zero() {
            return 0;
        }
        let mut fired = 0u32;
        while now >= self.next {
            self.next += self.period;
            fired = fired.saturating_add(1);
        }
        fired
    }

    pub fn shift(&mut self, by: Duration) {
        self.next += by;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_deadline() {
        let t0 = Instant::now();
        let mut t = Timer::idle();
        t.schedule(t0, Duration::from_millis(200));
        assert!(!t.fire(t0 + Duration::from_millis(199)));
        assert!(t.fire(t0 + Duration::from_millis(200)));
        assert!(!t.fire(t0 + Duration::from_millis(500)));
        assert_eq!(t.remaining(t0), None);
    }

    #[test]
    fn reschedule_replaces_old_deadline() {
        let t0 = Instant::now();
        let mut t = Timer::idle();
        t.schedule(t0, Duration::from_millis(100));
        t.schedule(t0 + Duration::from_millis(50), Duration::from_millis(100));
        assert!(!t.fire(t0 + Duration::from_millis(120)));
        assert!(t.fire(t0 + Duration::from_millis(150)));
    }

    #[test]
    fn cancel_and_shift() {
        let t0 = Instant::now();
        let mut t = Timer::idle();
        t.schedule(t0, Duration::from_millis(100));
        t.shift(Duration::from_millis(400));
        assert!(!t.fire(t0 + Duration::from_millis(300)));
        assert_eq!(t.remaining(t0 + Duration::from_millis(300)), Some(Duration::from_millis(200)));
        t.cancel();
        assert!(!t.fire(t0 + Duration::from_secs(10)));
        assert_eq!(t.remaining_ratio(t0), 0.0);
    }

    #[test]
    fn interval_catches_up() {
        let t0 = Instant::now();
        let mut iv = Interval::new(t0, Duration::from_millis(400));
        assert_eq!(iv.poll(t0 + Duration::from_millis(399)), 0);
        assert_eq!(iv.poll(t0 + Duration::from_millis(1250)), 3);
        assert_eq!(iv.poll(t0 + Duration::from_millis(1599)), 0);
        assert_eq!(iv.poll(t0 + Duration::from_millis(1600)), 1);
    }
}
