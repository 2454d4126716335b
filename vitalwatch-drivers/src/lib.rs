//! Hardware adapter implementations
//!
//! This crate provides implementations of the collaborator traits defined
//! in vitalwatch-core on top of `embedded-hal` 1.0:
//!
//! - Cuff pump actuation over a GPIO output pin
//! - Monitor clock over a `DelayNs` provider and a monotonic tick source
//! - Reference heart-rate/SpO2 window computation

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod pump;
pub mod spo2;

pub use clock::HalClock;
pub use pump::GpioPump;
pub use spo2::PeakDetectSpO2;
