//! Sensor bank and vitals estimation
//!
//! Turns raw sensor reads into the shared [`HealthReading`] once per
//! acquisition cycle.

pub mod bank;
pub mod estimator;
pub mod reading;

pub use bank::{RawReading, SensorBank};
pub use estimator::{CycleSummary, PulseOutcome, VitalsEstimator, MAX_WINDOW_LEN};
pub use reading::{HealthReading, SensorAvailability, SensorKind, NO_SIGNAL, UNAVAILABLE};
