//! Time sources and the cooperative fixed-rate schedule.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for tests and headless replays. Clones share one time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Remembers when the simulation last stepped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationClock {
    last: Option<Duration>,
}

impl SimulationClock {
    /// Seconds elapsed since the previous call, or `None` on the first call.
    /// A clock that went backwards yields zero.
    pub fn advance(&mut self, now: Duration) -> Option<f32> {
        let previous = self.last.replace(now)?;
        Some(now.saturating_sub(previous).as_secs_f32())
    }

    pub fn last(&self) -> Option<Duration> {
        self.last
    }
}

/// Interval timer polled from a cooperative loop.
///
/// The first poll arms the timer; it then fires once per `period`. Missed
/// periods collapse into one firing.
#[derive(Debug, Clone, Copy)]
pub struct FixedRateTimer {
    period: Duration,
    next_due: Option<Duration>,
}

impl FixedRateTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns true when the timer fires at `now`.
    pub fn poll(&mut self, now: Duration) -> bool {
        let Some(due) = self.next_due else {
            self.next_due = Some(now + self.period);
            return false;
        };
        if now < due {
            return false;
        }
        let next = due + self.period;
        self.next_due = Some(if next <= now { now + self.period } else { next });
        true
    }

    /// Time left until the next firing; zero when due or not yet armed.
    pub fn time_until_due(&self, now: Duration) -> Duration {
        self.next_due
            .map_or(Duration::ZERO, |due| due.saturating_sub(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_advance_only_records() {
        let mut clock = SimulationClock::default();
        assert_eq!(clock.advance(Duration::from_millis(100)), None);
        assert_eq!(clock.last(), Some(Duration::from_millis(100)));
        let dt = clock.advance(Duration::from_millis(150)).unwrap();
        assert!((dt - 0.05).abs() < 1e-6);
    }

    #[test]
    fn repeated_timestamp_gives_zero_delta() {
        let mut clock = SimulationClock::default();
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.advance(Duration::from_secs(1)), Some(0.0));
        assert_eq!(clock.advance(Duration::from_millis(500)), Some(0.0));
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.advance(Duration::from_millis(16));
        assert_eq!(view.now(), Duration::from_millis(16));
        clock.set(Duration::from_secs(3));
        assert_eq!(view.now(), Duration::from_secs(3));
    }

    #[test]
    fn timer_fires_once_per_period() {
        let mut timer = FixedRateTimer::new(Duration::from_millis(10));
        assert!(!timer.poll(Duration::ZERO));
        assert!(!timer.poll(Duration::from_millis(5)));
        assert_eq!(timer.time_until_due(Duration::from_millis(5)), Duration::from_millis(5));
        assert!(timer.poll(Duration::from_millis(10)));
        assert!(!timer.poll(Duration::from_millis(12)));
        assert!(timer.poll(Duration::from_millis(21)));
    }

    #[test]
    fn timer_collapses_missed_periods() {
        let mut timer = FixedRateTimer::new(Duration::from_millis(10));
        timer.poll(Duration::ZERO);
        assert!(timer.poll(Duration::from_millis(95)));
        assert!(!timer.poll(Duration::from_millis(100)));
        assert!(timer.poll(Duration::from_millis(105)));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
