//! Collaborator traits
//!
//! These traits define the interface between the monitor logic and the
//! sensor drivers, actuators, network stack and time source that surround it.

pub mod clock;
pub mod link;
pub mod sensor;

pub use clock::Clock;
pub use link::{CommandSource, Session, Transport};
pub use sensor::{
    Accelerometer, PressureSensor, PulseOximeter, PumpOutput, SpO2Algorithm, TemperatureProbe,
    WindowEstimate, TEMPERATURE_DISCONNECTED_C,
};
