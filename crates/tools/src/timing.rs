use serde::Serialize;
use std::time::Duration;

/// Rolling window of recent step durations.
#[derive(Debug)]
pub struct FrameTimer {
    samples: Vec<Duration>,
    capacity: usize,
    next: usize,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            next: 0,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.samples.len() < self.capacity {
            self.samples.push(dt);
        } else {
            self.samples[self.next] = dt;
        }
        self.next = (self.next + 1) % self.capacity;
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or_default()
    }

    pub fn min(&self) -> Duration {
        self.samples.iter().copied().min().unwrap_or_default()
    }

    /// Samples in the window that took longer than `budget`.
    pub fn over_budget(&self, budget: Duration) -> usize {
        self.samples.iter().filter(|d| **d > budget).count()
    }

    pub fn summary(&self, budget: Duration) -> TimingSummary {
        TimingSummary {
            samples: self.count(),
            average_us: self.average().as_micros() as u64,
            min_us: self.min().as_micros() as u64,
            max_us: self.max().as_micros() as u64,
            over_budget: self.over_budget(budget),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimingSummary {
    pub samples: usize,
    pub average_us: u64,
    pub min_us: u64,
    pub max_us: u64,
    pub over_budget: usize,
}

impl std::fmt::Display for TimingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Step time: avg={}us min={}us max={}us over_budget={}/{}",
            self.average_us, self.min_us, self.max_us, self.over_budget, self.samples
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_timer_reports_zero() {
        let timer = FrameTimer::new(4);
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.average(), Duration::ZERO);
        assert_eq!(timer.max(), Duration::ZERO);
    }

    #[test]
    fn window_drops_oldest() {
        let mut timer = FrameTimer::new(3);
        for ms in [10, 1, 2, 3] {
            timer.record(Duration::from_millis(ms));
        }
        assert_eq!(timer.count(), 3);
        assert_eq!(timer.max(), Duration::from_millis(3));
        assert_eq!(timer.min(), Duration::from_millis(1));
        assert_eq!(timer.average(), Duration::from_millis(2));
    }

    #[test]
    fn budget_overruns_counted() {
        let mut timer = FrameTimer::new(8);
        for ms in [5, 20, 30, 10] {
            timer.record(Duration::from_millis(ms));
        }
        let summary = timer.summary(Duration::from_millis(16));
        assert_eq!(summary.over_budget, 2);
        assert_eq!(summary.max_us, 30_000);
        assert!(summary.to_string().contains("over_budget=2/4"));
    }
}
