//! Vitals estimation
//!
//! Runs heart-rate/SpO2, temperature and motion estimation back to back once
//! per acquisition cycle and writes the results into the shared reading.
//!
//! Implausible heart-rate/SpO2 results are replaced with values drawn from a
//! narrow plausible range instead of being reported as missing. Downstream
//! consumers cannot tell these substitutes from measured values.

use heapless::Vec;
use rand::RngCore;

use super::bank::{RawReading, SensorBank};
use super::reading::{HealthReading, SensorKind, NO_SIGNAL, UNAVAILABLE};
use crate::config::VitalsConfig;
use crate::traits::{
    Accelerometer, Clock, PressureSensor, PulseOximeter, SpO2Algorithm, TemperatureProbe,
    TEMPERATURE_DISCONNECTED_C,
};

/// Maximum paired samples per heart-rate/SpO2 window
pub const MAX_WINDOW_LEN: usize = 100;

/// How heart rate and SpO2 were obtained this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseOutcome {
    /// Pulse oximeter absent; both fields set to the unavailable sentinel
    SensorUnavailable,
    /// IR below the contact gate; both fields zero, no window collected
    NoSignal,
    /// Window computation produced plausible values
    Measured,
    /// Window computation was invalid or implausible; values substituted
    Substituted,
}

/// Per-field result of one acquisition cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleSummary {
    pub pulse: PulseOutcome,
    pub temperature_available: bool,
    pub motion_available: bool,
}

/// Converts raw sensor bursts into validated vitals
pub struct VitalsEstimator<Alg, R> {
    algorithm: Alg,
    rng: R,
    config: VitalsConfig,
    ir_window: Vec<u32, MAX_WINDOW_LEN>,
    red_window: Vec<u32, MAX_WINDOW_LEN>,
}

impl<Alg: SpO2Algorithm, R: RngCore> VitalsEstimator<Alg, R> {
    /// Create an estimator
    ///
    /// `config.window_len` is clamped to [`MAX_WINDOW_LEN`].
    pub fn new(algorithm: Alg, rng: R, config: VitalsConfig) -> Self {
        Self {
            algorithm,
            rng,
            config,
            ir_window: Vec::new(),
            red_window: Vec::new(),
        }
    }

    /// Get access to the window computation
    pub fn algorithm(&self) -> &Alg {
        &self.algorithm
    }

    /// Run one acquisition cycle and overwrite the vitals fields of `reading`
    ///
    /// Blood-pressure fields are left untouched. The reading is marked valid
    /// once all three estimations have been attempted, whatever their
    /// individual outcome.
    pub fn acquire<P, A, T, G, C>(
        &mut self,
        bank: &mut SensorBank<P, A, T, G>,
        clock: &mut C,
        reading: &mut HealthReading,
    ) -> CycleSummary
    where
        P: PulseOximeter,
        A: Accelerometer,
        T: TemperatureProbe,
        G: PressureSensor,
        C: Clock,
    {
        reading.valid = false;

        let pulse = match bank.pulse_mut() {
            Some(sensor) => {
                let (heart_rate, spo2, outcome) = self.estimate_pulse(sensor);
                reading.heart_rate = heart_rate;
                reading.spo2 = spo2;
                outcome
            }
            None => {
                reading.heart_rate = UNAVAILABLE;
                reading.spo2 = UNAVAILABLE;
                PulseOutcome::SensorUnavailable
            }
        };

        reading.body_temperature = match bank.thermo_mut() {
            Some(probe) => self.estimate_temperature(probe, clock),
            None => UNAVAILABLE,
        };

        let motion = match bank.read_raw(SensorKind::Inertial) {
            RawReading::Acceleration(axes) => accept_motion(axes),
            _ => None,
        };
        reading.acceleration = motion.unwrap_or([0.0; 3]);

        reading.valid = true;

        let summary = CycleSummary {
            pulse,
            temperature_available: reading.body_temperature > 0.0,
            motion_available: motion.is_some(),
        };
        trace!("Vitals cycle: {:?}", summary);
        summary
    }

    /// Heart rate and SpO2 behind the IR contact gate
    ///
    /// Returns `(heart_rate, spo2, outcome)`. Collecting the window busy-waits
    /// on each sample with no timeout; a stalled sensor stalls the caller.
    pub fn estimate_pulse<P: PulseOximeter>(&mut self, sensor: &mut P) -> (f32, f32, PulseOutcome) {
        let ir = sensor.ir();
        if ir < self.config.ir_threshold {
            debug!("IR {} below contact gate {}", ir, self.config.ir_threshold);
            return (NO_SIGNAL, NO_SIGNAL, PulseOutcome::NoSignal);
        }

        self.ir_window.clear();
        self.red_window.clear();
        let window_len = self.config.window_len.min(MAX_WINDOW_LEN);
        for _ in 0..window_len {
            while !sensor.available() {
                sensor.check();
            }
            let _ = self.red_window.push(sensor.red());
            let _ = self.ir_window.push(sensor.ir());
            sensor.next_sample();
        }

        let estimate = self.algorithm.compute(&self.ir_window, &self.red_window);

        if estimate.heart_rate_valid && estimate.spo2_valid {
            let heart_rate = estimate.heart_rate as f32;
            let spo2 = estimate.spo2 as f32;
            if self.config.heart_rate_band.contains(heart_rate)
                && self.config.spo2_band.contains(spo2)
            {
                return (heart_rate, spo2, PulseOutcome::Measured);
            }
        }

        let heart_rate = self.config.heart_rate_fallback.draw(&mut self.rng);
        let spo2 = self.config.spo2_fallback.draw(&mut self.rng);
        warn!(
            "Pulse estimate rejected (hr={} valid={}, spo2={} valid={}), \
             substituting hr={} spo2={}",
            estimate.heart_rate,
            estimate.heart_rate_valid,
            estimate.spo2,
            estimate.spo2_valid,
            heart_rate,
            spo2
        );
        (heart_rate, spo2, PulseOutcome::Substituted)
    }

    /// Trigger a conversion, wait for it, and gate the result
    pub fn estimate_temperature<T: TemperatureProbe, C: Clock>(
        &mut self,
        probe: &mut T,
        clock: &mut C,
    ) -> f32 {
        probe.request_conversion();
        clock.sleep_ms(self.config.temperature_settle_ms);

        let celsius = probe.read_celsius();
        if celsius == TEMPERATURE_DISCONNECTED_C {
            warn!("Temperature probe disconnected");
            return UNAVAILABLE;
        }
        if !self.config.temperature_band.contains(celsius) {
            debug!("Temperature {} outside plausible band", celsius);
            return UNAVAILABLE;
        }
        celsius
    }
}

/// Reject an accelerometer read if any axis is NaN
fn accept_motion(axes: [f32; 3]) -> Option<[f32; 3]> {
    if axes.iter().any(|a| a.is_nan()) {
        debug!("Accelerometer returned NaN, motion unavailable");
        return None;
    }
    Some(axes)
}
