//! Shared vitals record and sensor availability

/// Sentinel for a field whose sensor is absent or whose value was rejected
pub const UNAVAILABLE: f32 = -1.0;

/// Sentinel for heart rate / SpO2 when the IR gate found no skin contact
pub const NO_SIGNAL: f32 = 0.0;

/// The four sensor kinds handled by the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    /// Optical pulse oximeter
    PulseOximeter,
    /// Inertial measurement unit (accelerometer)
    Inertial,
    /// Contact temperature probe
    Temperature,
    /// Strain-gauge cuff pressure sensor
    Pressure,
}

impl SensorKind {
    /// All kinds, in probing order
    pub const ALL: [SensorKind; 4] = [
        SensorKind::PulseOximeter,
        SensorKind::Inertial,
        SensorKind::Temperature,
        SensorKind::Pressure,
    ];
}

/// Which sensors answered during initialization
///
/// Set once at startup and never revised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorAvailability {
    pub pulse_oximeter: bool,
    pub inertial: bool,
    pub temperature: bool,
    pub pressure: bool,
}

impl SensorAvailability {
    /// Check a single sensor
    pub fn is_available(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::PulseOximeter => self.pulse_oximeter,
            SensorKind::Inertial => self.inertial,
            SensorKind::Temperature => self.temperature,
            SensorKind::Pressure => self.pressure,
        }
    }

    /// Number of sensors that answered
    pub fn count(&self) -> usize {
        SensorKind::ALL
            .iter()
            .filter(|kind| self.is_available(**kind))
            .count()
    }

    pub(crate) fn set(&mut self, kind: SensorKind, available: bool) {
        match kind {
            SensorKind::PulseOximeter => self.pulse_oximeter = available,
            SensorKind::Inertial => self.inertial = available,
            SensorKind::Temperature => self.temperature = available,
            SensorKind::Pressure => self.pressure = available,
        }
    }
}

/// Latest known vitals
///
/// Each field carries its own availability through a sentinel `<= 0`;
/// `valid` only says the last acquisition cycle ran to completion.
/// Vitals fields are overwritten every cycle, blood-pressure fields only
/// when a cuff measurement completes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HealthReading {
    /// Heart rate (bpm)
    pub heart_rate: f32,
    /// Oxygen saturation (%)
    pub spo2: f32,
    /// Body temperature (°C)
    pub body_temperature: f32,
    /// Acceleration X, Y, Z (g)
    pub acceleration: [f32; 3],
    /// Systolic pressure (mmHg), 0 until first measurement
    pub bp_systolic: f32,
    /// Diastolic pressure (mmHg), 0 until first measurement
    pub bp_diastolic: f32,
    /// Last acquisition cycle completed
    pub valid: bool,
}

impl HealthReading {
    /// Heart rate, if present this cycle
    pub fn heart_rate_bpm(&self) -> Option<f32> {
        (self.heart_rate > 0.0).then_some(self.heart_rate)
    }

    /// SpO2, if present this cycle
    pub fn spo2_percent(&self) -> Option<f32> {
        (self.spo2 > 0.0).then_some(self.spo2)
    }

    /// Body temperature, if present this cycle
    pub fn body_temperature_c(&self) -> Option<f32> {
        (self.body_temperature > 0.0).then_some(self.body_temperature)
    }

    /// Systolic/diastolic pair, once any measurement has succeeded
    pub fn blood_pressure(&self) -> Option<(f32, f32)> {
        (self.bp_systolic > 0.0).then_some((self.bp_systolic, self.bp_diastolic))
    }

    /// Whether heart rate and SpO2 are both present
    pub fn has_core_vitals(&self) -> bool {
        self.heart_rate > 0.0 && self.spo2 > 0.0
    }

    /// Squared magnitude of the acceleration vector (g²)
    pub fn acceleration_magnitude_sq(&self) -> f32 {
        self.acceleration.iter().map(|a| a * a).sum()
    }
}
