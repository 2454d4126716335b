//! Simulated platform wiring

use std::marker::PhantomData;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use vitalwatch_core::scheduler::{MonitorParts, Platform};
use vitalwatch_core::traits::{Clock, CommandSource};
use vitalwatch_drivers::{GpioPump, PeakDetectSpO2};

use crate::config::SimulationConfig;
use crate::link::{SimSession, SimTransport};
use crate::sensors::{SimAccel, SimPin, SimPressure, SimPulse, SimThermo};

/// Simulated collaborators with a caller-chosen clock and console
pub struct SimPlatform<C, K>(PhantomData<(C, K)>);

impl<C: Clock, K: CommandSource> Platform for SimPlatform<C, K> {
    type Pulse = SimPulse;
    type Inertial = SimAccel;
    type Thermo = SimThermo;
    type Pressure = SimPressure;
    type Pump = GpioPump<SimPin>;
    type Algorithm = PeakDetectSpO2;
    type Rng = SmallRng;
    type Transport = SimTransport;
    type Session = SimSession;
    type Console = K;
    type Clock = C;
}

/// Build every simulated collaborator from `sim`
///
/// Each noise source gets its own stream derived from the seed.
pub fn build_parts<C, K>(
    sim: &SimulationConfig,
    clock: C,
    console: K,
) -> MonitorParts<SimPlatform<C, K>>
where
    C: Clock,
    K: CommandSource,
{
    let seed = sim.seed.unwrap_or_else(rand::random);
    let stream = |n: u64| SmallRng::seed_from_u64(seed.wrapping_add(n));

    let pump_pin = SimPin::default();

    MonitorParts {
        pulse: SimPulse::new(sim, stream(0)),
        inertial: SimAccel::new(sim, stream(1)),
        thermo: SimThermo::new(sim, stream(2)),
        pressure: SimPressure::new(sim, pump_pin.clone(), stream(3)),
        pump: GpioPump::new_active_high(pump_pin),
        algorithm: PeakDetectSpO2::default(),
        vitals_rng: stream(4),
        bp_rng: stream(5),
        transport: SimTransport::new(sim.transport_up_after_polls),
        session: SimSession::new(sim.session_failures),
        console,
        clock,
    }
}
