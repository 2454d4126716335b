//! Time source trait

/// Monotonic millisecond clock with a blocking sleep primitive
///
/// Every delay and readiness wait in the monitor goes through this trait so
/// that tests can substitute a clock that advances only when slept on.
pub trait Clock {
    /// Milliseconds elapsed since an arbitrary fixed origin
    fn now_ms(&self) -> u64;

    /// Block the calling thread of control for `ms` milliseconds
    fn sleep_ms(&mut self, ms: u32);

    /// Milliseconds elapsed since `since_ms`
    fn elapsed_since(&self, since_ms: u64) -> u64 {
        self.now_ms().saturating_sub(since_ms)
    }
}
