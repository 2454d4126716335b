//! Uniform init/read facade over the four sensor collaborators

use super::reading::{SensorAvailability, SensorKind};
use crate::config::SensorBankConfig;
use crate::traits::{Accelerometer, Clock, PressureSensor, PulseOximeter, TemperatureProbe};

/// One raw read from a sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RawReading {
    /// Sensor did not answer during initialization
    Unavailable,
    /// Instantaneous infrared intensity
    PulseIr(u32),
    /// Acceleration X, Y, Z (g)
    Acceleration([f32; 3]),
    /// Last converted temperature (°C)
    Temperature(f32),
    /// One scaled pressure sample
    Pressure(f32),
}

/// Poll `ready` until it reports true or `timeout_ms` elapses
///
/// Sleeps 1 ms between polls.
pub(crate) fn wait_until<C: Clock>(
    clock: &mut C,
    timeout_ms: u32,
    mut ready: impl FnMut() -> bool,
) -> bool {
    let start = clock.now_ms();
    loop {
        if ready() {
            return true;
        }
        if clock.elapsed_since(start) >= timeout_ms as u64 {
            return false;
        }
        clock.sleep_ms(1);
    }
}

/// The monitor's four sensors and their availability
///
/// Sensors that fail to answer during [`SensorBank::init`] are skipped for
/// the rest of the run; there is no hot-plug detection.
pub struct SensorBank<P, A, T, G> {
    pulse: P,
    inertial: A,
    thermo: T,
    pressure: G,
    config: SensorBankConfig,
    availability: SensorAvailability,
}

impl<P, A, T, G> SensorBank<P, A, T, G>
where
    P: PulseOximeter,
    A: Accelerometer,
    T: TemperatureProbe,
    G: PressureSensor,
{
    /// Create a bank; nothing is probed until [`SensorBank::init`]
    pub fn new(pulse: P, inertial: A, thermo: T, pressure: G, config: SensorBankConfig) -> Self {
        Self {
            pulse,
            inertial,
            thermo,
            pressure,
            config,
            availability: SensorAvailability::default(),
        }
    }

    /// Probe each sensor once, in sequence
    ///
    /// Sensors share a bus, so probes are separated by a settle delay.
    /// A failing sensor is recorded and probing continues.
    pub fn init<C: Clock>(&mut self, clock: &mut C) -> SensorAvailability {
        let mut availability = SensorAvailability::default();

        availability.set(SensorKind::PulseOximeter, self.pulse.init());
        clock.sleep_ms(self.config.probe_settle_ms);

        availability.set(SensorKind::Inertial, self.inertial.init());
        clock.sleep_ms(self.config.probe_settle_ms);

        self.thermo.begin();
        clock.sleep_ms(self.config.temperature_begin_settle_ms);
        availability.set(SensorKind::Temperature, self.thermo.is_present());
        clock.sleep_ms(self.config.probe_settle_ms);

        self.pressure.begin();
        let pressure = &mut self.pressure;
        let pressure_ready = wait_until(clock, self.config.pressure_ready_timeout_ms, || {
            pressure.is_ready()
        });
        if pressure_ready {
            self.pressure.tare();
            clock.sleep_ms(self.config.pressure_tare_settle_ms);
        }
        availability.set(SensorKind::Pressure, pressure_ready);

        for kind in SensorKind::ALL {
            if availability.is_available(kind) {
                info!("Sensor {:?} ready", kind);
            } else {
                warn!("Sensor {:?} not detected, continuing without it", kind);
            }
        }

        self.availability = availability;
        availability
    }

    /// Availability recorded by the last [`SensorBank::init`]
    pub fn availability(&self) -> SensorAvailability {
        self.availability
    }

    /// Check a single sensor
    pub fn is_available(&self, kind: SensorKind) -> bool {
        self.availability.is_available(kind)
    }

    /// Single synchronous read, delegated to the collaborator
    ///
    /// Never retries and never waits beyond the collaborator's own bounds.
    /// Motion sampling goes through here; multi-step sequences (pulse window,
    /// temperature conversion, cuff cycle) borrow the sensor instead.
    pub fn read_raw(&mut self, kind: SensorKind) -> RawReading {
        if !self.is_available(kind) {
            return RawReading::Unavailable;
        }
        match kind {
            SensorKind::PulseOximeter => RawReading::PulseIr(self.pulse.ir()),
            SensorKind::Inertial => RawReading::Acceleration(self.inertial.read_axes()),
            SensorKind::Temperature => RawReading::Temperature(self.thermo.read_celsius()),
            SensorKind::Pressure => RawReading::Pressure(self.pressure.read_units()),
        }
    }

    /// Pulse oximeter, if it answered during init
    pub fn pulse_mut(&mut self) -> Option<&mut P> {
        self.availability.pulse_oximeter.then_some(&mut self.pulse)
    }

    /// Temperature probe, if it answered during init
    pub fn thermo_mut(&mut self) -> Option<&mut T> {
        self.availability.temperature.then_some(&mut self.thermo)
    }

    /// Pressure sensor, if it answered during init
    pub fn pressure_mut(&mut self) -> Option<&mut G> {
        self.availability.pressure.then_some(&mut self.pressure)
    }
}
