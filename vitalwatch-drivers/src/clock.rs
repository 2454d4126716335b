//! Monitor clock over embedded-hal delays

use embedded_hal::delay::DelayNs;
use vitalwatch_core::traits::Clock;

/// [`Clock`] built from a blocking delay and a millisecond tick source
///
/// `ticks` must be monotonic; it is typically a closure over the board's
/// timer peripheral.
pub struct HalClock<D, T> {
    delay: D,
    ticks: T,
}

impl<D, T> HalClock<D, T>
where
    D: DelayNs,
    T: Fn() -> u64,
{
    pub fn new(delay: D, ticks: T) -> Self {
        Self { delay, ticks }
    }
}

impl<D, T> Clock for HalClock<D, T>
where
    D: DelayNs,
    T: Fn() -> u64,
{
    fn now_ms(&self) -> u64 {
        (self.ticks)()
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
