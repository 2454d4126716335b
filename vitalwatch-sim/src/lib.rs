//! Host simulator for the Vitalwatch monitor
//!
//! Runs the unmodified monitor loop from vitalwatch-core against simulated
//! sensors, a simulated broker link and either the wall clock or a virtual
//! clock.

pub mod clock;
pub mod config;
pub mod console;
pub mod error;
pub mod link;
pub mod platform;
pub mod sensors;

pub use clock::{wall_clock, VirtualClock, WallClock};
pub use config::{SimConfig, SimulationConfig};
pub use console::{QueuedConsole, StdinConsole};
pub use error::SimError;
pub use platform::{build_parts, SimPlatform};
