//! Elapsed-time task gate

/// Fires once `period_ms` has elapsed since the last mark
///
/// Starts marked at time zero. Missed periods are not queued: a late task
/// runs once and the period restarts from the time it was marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interval {
    period_ms: u64,
    last_ms: u64,
}

impl Interval {
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms: period_ms as u64,
            last_ms: 0,
        }
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_ms) >= self.period_ms
    }

    pub fn mark(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_after_period() {
        let mut timer = Interval::new(2000);
        assert!(!timer.is_due(1999));
        assert!(timer.is_due(2000));

        timer.mark(2000);
        assert!(!timer.is_due(3999));
        assert!(timer.is_due(4000));
    }

    #[test]
    fn test_late_run_is_not_compensated() {
        let mut timer = Interval::new(2000);
        // Blocked well past two periods
        assert!(timer.is_due(6500));
        timer.mark(6500);
        assert!(!timer.is_due(8000));
        assert!(timer.is_due(8500));
    }

    #[test]
    fn test_clock_behind_mark() {
        let mut timer = Interval::new(10);
        timer.mark(100);
        assert!(!timer.is_due(50));
    }
}
