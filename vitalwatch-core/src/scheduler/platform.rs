//! Collaborator bundle for the monitor

use rand::RngCore;

use crate::traits::{
    Accelerometer, Clock, CommandSource, PressureSensor, PulseOximeter, PumpOutput, Session,
    SpO2Algorithm, TemperatureProbe, Transport,
};

/// Concrete collaborator types of one target
///
/// Implemented once per board (or simulator) so that the monitor can be
/// named with a single type parameter.
pub trait Platform {
    type Pulse: PulseOximeter;
    type Inertial: Accelerometer;
    type Thermo: TemperatureProbe;
    type Pressure: PressureSensor;
    type Pump: PumpOutput;
    type Algorithm: SpO2Algorithm;
    type Rng: RngCore;
    type Transport: Transport;
    type Session: Session;
    type Console: CommandSource;
    type Clock: Clock;
}

/// Collaborator instances handed to [`Monitor::new`](super::Monitor::new)
pub struct MonitorParts<H: Platform> {
    pub pulse: H::Pulse,
    pub inertial: H::Inertial,
    pub thermo: H::Thermo,
    pub pressure: H::Pressure,
    pub pump: H::Pump,
    pub algorithm: H::Algorithm,
    /// Source for substituted heart-rate/SpO2 values
    pub vitals_rng: H::Rng,
    /// Source for substituted blood-pressure values
    pub bp_rng: H::Rng,
    pub transport: H::Transport,
    pub session: H::Session,
    pub console: H::Console,
    pub clock: H::Clock,
}
