//! Simulated sensors and cuff pump
//!
//! The pulse oximeter synthesizes a 25 Hz photoplethysmogram whose peak
//! spacing and red/IR perfusion ratio match the configured heart rate and
//! SpO2. The cuff sensor only reports pressure while the simulated pump pin
//! is driven high.

use std::cell::Cell;
use std::convert::Infallible;
use std::f32::consts::PI;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use rand::rngs::SmallRng;
use rand::Rng;
use vitalwatch_core::traits::{
    Accelerometer, PressureSensor, PulseOximeter, TemperatureProbe, TEMPERATURE_DISCONNECTED_C,
};

use crate::config::SimulationConfig;

const SAMPLE_RATE_HZ: f32 = 25.0;
const IR_DC: f32 = 110_000.0;
const IR_AC: f32 = 1_500.0;
const RED_DC: f32 = 60_000.0;
const NO_CONTACT_IR: f32 = 4_000.0;
const PPG_NOISE: f32 = 15.0;

/// Red/IR perfusion ratio that the quadratic calibration maps to `spo2`
///
/// Takes the root on the falling side of the curve, where lower saturation
/// means a higher ratio.
pub fn ratio_for_spo2(spo2: f32) -> f32 {
    const A: f32 = 45.060;
    const B: f32 = 30.354;
    const C: f32 = 94.845;
    let discriminant = (B * B - 4.0 * A * (spo2 - C)).max(0.0);
    (B + discriminant.sqrt()) / (2.0 * A)
}

/// Simulated optical pulse oximeter
pub struct SimPulse {
    present: bool,
    contact: bool,
    heart_rate_bpm: f32,
    red_ac: f32,
    sample: u32,
    rng: SmallRng,
}

impl SimPulse {
    pub fn new(sim: &SimulationConfig, rng: SmallRng) -> Self {
        let ratio = ratio_for_spo2(sim.spo2_percent);
        Self {
            present: sim.sensors.pulse_oximeter,
            contact: sim.skin_contact,
            heart_rate_bpm: sim.heart_rate_bpm,
            red_ac: ratio * RED_DC * IR_AC / IR_DC,
            sample: 0,
            rng,
        }
    }

    fn wave(&self) -> f32 {
        let beats_per_sample = self.heart_rate_bpm / (60.0 * SAMPLE_RATE_HZ);
        (2.0 * PI * self.sample as f32 * beats_per_sample).sin()
    }

    fn noise(&mut self) -> f32 {
        self.rng.gen_range(-PPG_NOISE..=PPG_NOISE)
    }
}

impl PulseOximeter for SimPulse {
    fn init(&mut self) -> bool {
        self.present
    }

    fn ir(&mut self) -> u32 {
        let level = if self.contact {
            IR_DC + IR_AC * self.wave()
        } else {
            NO_CONTACT_IR
        };
        (level + self.noise()).max(0.0) as u32
    }

    fn red(&mut self) -> u32 {
        let level = if self.contact {
            RED_DC + self.red_ac * self.wave()
        } else {
            NO_CONTACT_IR / 2.0
        };
        (level + self.noise()).max(0.0) as u32
    }

    fn available(&mut self) -> bool {
        true
    }

    fn check(&mut self) {}

    fn next_sample(&mut self) {
        self.sample = self.sample.wrapping_add(1);
    }
}

/// Simulated accelerometer lying flat with slight tremor
pub struct SimAccel {
    present: bool,
    rng: SmallRng,
}

impl SimAccel {
    pub fn new(sim: &SimulationConfig, rng: SmallRng) -> Self {
        Self {
            present: sim.sensors.inertial,
            rng,
        }
    }
}

impl Accelerometer for SimAccel {
    fn init(&mut self) -> bool {
        self.present
    }

    fn read_axes(&mut self) -> [f32; 3] {
        let mut tremor = || self.rng.gen_range(-0.02f32..=0.02);
        [tremor(), tremor(), 1.0 + tremor()]
    }
}

/// Simulated contact temperature probe
pub struct SimThermo {
    present: bool,
    celsius: f32,
    rng: SmallRng,
}

impl SimThermo {
    pub fn new(sim: &SimulationConfig, rng: SmallRng) -> Self {
        Self {
            present: sim.sensors.temperature,
            celsius: sim.body_temperature_c,
            rng,
        }
    }
}

impl TemperatureProbe for SimThermo {
    fn begin(&mut self) {}

    fn is_present(&mut self) -> bool {
        self.present
    }

    fn request_conversion(&mut self) {}

    fn read_celsius(&mut self) -> f32 {
        if !self.present {
            return TEMPERATURE_DISCONNECTED_C;
        }
        // 12-bit probe resolution
        let raw = self.celsius + self.rng.gen_range(-0.1f32..=0.1);
        (raw * 16.0).round() / 16.0
    }
}

/// Output pin shared between the pump driver and the cuff sensor
#[derive(Clone, Default)]
pub struct SimPin {
    high: Rc<Cell<bool>>,
}

impl SimPin {
    pub fn is_high(&self) -> bool {
        self.high.get()
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high.set(true);
        Ok(())
    }
}

/// Simulated strain-gauge cuff sensor
///
/// While the pump runs the reading climbs from 250 to 350 units over 100
/// samples; with the pump off it stays near the tared baseline.
pub struct SimPressure {
    present: bool,
    pump: SimPin,
    inflation: u32,
    rng: SmallRng,
}

impl SimPressure {
    pub fn new(sim: &SimulationConfig, pump: SimPin, rng: SmallRng) -> Self {
        Self {
            present: sim.sensors.pressure,
            pump,
            inflation: 0,
            rng,
        }
    }
}

impl PressureSensor for SimPressure {
    fn begin(&mut self) {}

    fn is_ready(&mut self) -> bool {
        self.present
    }

    fn tare(&mut self) {
        self.inflation = 0;
    }

    fn read_units(&mut self) -> f32 {
        let noise = self.rng.gen_range(-2.0f32..=2.0);
        if !self.pump.is_high() {
            self.inflation = 0;
            return noise;
        }
        let level = 250.0 + self.inflation.min(100) as f32;
        self.inflation += 1;
        level + noise
    }
}
