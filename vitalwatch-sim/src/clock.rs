//! Host clocks
//!
//! [`wall_clock`] runs the monitor in real time on top of the
//! `embedded-hal` clock adapter. [`VirtualClock`] only advances when slept
//! on, so whole monitor runs finish instantly in tests.

use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use vitalwatch_core::traits::Clock;
use vitalwatch_drivers::HalClock;

/// Blocking delay on the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// Real-time monitor clock
pub type WallClock = HalClock<StdDelay, Box<dyn Fn() -> u64>>;

/// Create a clock whose origin is the moment of the call
pub fn wall_clock() -> WallClock {
    let origin = Instant::now();
    HalClock::new(StdDelay, Box::new(move || origin.elapsed().as_millis() as u64))
}

/// Clock that advances only when slept on or advanced explicitly
#[derive(Debug, Default, Clone)]
pub struct VirtualClock {
    now_ms: u64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.now_ms += ms as u64;
    }
}
