//! Monitor configuration type definitions

use heapless::String;
use rand::{Rng, RngCore};
use vitalwatch_protocol::Topic;

use super::link::LinkConfig;
use crate::pressure::MAX_TRACE_LEN;
use crate::vitals::MAX_WINDOW_LEN;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum device code length
pub const MAX_DEVICE_CODE_LEN: usize = 32;

/// Maximum topic domain length
pub const MAX_DOMAIN_LEN: usize = 24;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A periodic interval was zero
    ZeroInterval,
    /// Device code is empty
    EmptyDeviceCode,
    /// A plausibility band or fallback range has `min > max`
    InvalidRange,
    /// Sample window is empty or larger than the buffer
    WindowSize,
    /// Trace capacity below the minimum sample count or above the buffer
    TraceCapacity,
    /// Topic could not be built from the domain and device code
    Topic,
}

/// Inclusive numeric band
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Check whether `value` lies inside the band (inclusive)
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// Inclusive integer range used to draw fallback values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FallbackRange {
    pub min: u16,
    pub max: u16,
}

impl FallbackRange {
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Draw a whole-number value uniformly from the range
    pub fn draw<R: RngCore>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.min..=self.max) as f32
    }

    fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// When the cuff sequence runs on its own
///
/// Operator commands can force a measurement under every schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BpSchedule {
    /// Once at startup, then every `interval_ms`
    Periodic { interval_ms: u32 },
    /// Once at startup only
    Once,
    /// Only on operator command
    ManualOnly,
}

impl Default for BpSchedule {
    fn default() -> Self {
        BpSchedule::Periodic {
            interval_ms: 300_000,
        }
    }
}

impl BpSchedule {
    /// Whether a measurement is taken during setup
    pub fn measures_at_startup(&self) -> bool {
        matches!(self, BpSchedule::Periodic { .. } | BpSchedule::Once)
    }

    /// Repeat period, if the schedule repeats
    pub fn interval_ms(&self) -> Option<u32> {
        match self {
            BpSchedule::Periodic { interval_ms } => Some(*interval_ms),
            _ => None,
        }
    }
}

/// Task periods of the cooperative loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    /// Vitals acquisition period (ms)
    pub sensor_read_interval_ms: u32,
    /// Telemetry publish period (ms)
    pub publish_interval_ms: u32,
    /// Settle delay before the startup blood-pressure measurement (ms)
    pub startup_bp_delay_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sensor_read_interval_ms: 2000,
            publish_interval_ms: 2000,
            startup_bp_delay_ms: 2000,
        }
    }
}

/// Sensor probing delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorBankConfig {
    /// Settle delay between probing sensors that share a bus (ms)
    pub probe_settle_ms: u32,
    /// Delay between starting the temperature bus and counting devices (ms)
    pub temperature_begin_settle_ms: u32,
    /// Bounded wait for the pressure ADC during probing (ms)
    pub pressure_ready_timeout_ms: u32,
    /// Settle after the initial tare (ms)
    pub pressure_tare_settle_ms: u32,
}

impl Default for SensorBankConfig {
    fn default() -> Self {
        Self {
            probe_settle_ms: 200,
            temperature_begin_settle_ms: 100,
            pressure_ready_timeout_ms: 2000,
            pressure_tare_settle_ms: 500,
        }
    }
}

/// Vitals estimation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VitalsConfig {
    /// Minimum IR intensity treated as skin contact
    pub ir_threshold: u32,
    /// Paired red/IR samples per window
    pub window_len: usize,
    /// Accepted heart-rate band (bpm)
    pub heart_rate_band: Band,
    /// Accepted SpO2 band (%)
    pub spo2_band: Band,
    /// Substitute heart-rate range (bpm)
    pub heart_rate_fallback: FallbackRange,
    /// Substitute SpO2 range (%)
    pub spo2_fallback: FallbackRange,
    /// Conversion time of the temperature probe (ms)
    pub temperature_settle_ms: u32,
    /// Accepted body temperature band (°C)
    pub temperature_band: Band,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            ir_threshold: 50_000,
            window_len: MAX_WINDOW_LEN,
            heart_rate_band: Band::new(40.0, 200.0),
            spo2_band: Band::new(70.0, 100.0),
            heart_rate_fallback: FallbackRange::new(60, 100),
            spo2_fallback: FallbackRange::new(95, 99),
            temperature_settle_ms: 800,
            temperature_band: Band::new(20.0, 50.0),
        }
    }
}

/// Cuff sequence and estimation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BloodPressureConfig {
    /// Bounded wait for the pressure sensor before starting (ms)
    pub ready_timeout_ms: u32,
    /// Settle after zeroing the baseline (ms)
    pub tare_settle_ms: u32,
    /// Total pump-on sampling window (ms)
    pub pump_duration_ms: u32,
    /// Bounded wait for each sample (ms)
    pub sample_timeout_ms: u32,
    /// Pacing delay after each recorded sample (ms)
    pub inter_sample_ms: u32,
    /// Settle after switching the pump off (ms)
    pub release_settle_ms: u32,
    /// Minimum samples for an estimate
    pub min_samples: usize,
    /// Trace capacity (samples)
    pub trace_capacity: usize,
    /// Systolic offset (mmHg)
    pub systolic_offset: f32,
    /// Systolic gain applied to the trace maximum
    pub systolic_gain: f32,
    /// Diastolic offset (mmHg)
    pub diastolic_offset: f32,
    /// Diastolic gain applied to the trace minimum
    pub diastolic_gain: f32,
    /// Gap forced between systolic and diastolic when they cross (mmHg)
    pub forced_gap: f32,
    /// Accepted systolic band (mmHg)
    pub systolic_band: Band,
    /// Accepted diastolic band (mmHg)
    pub diastolic_band: Band,
    /// Substitute systolic range (mmHg)
    pub systolic_fallback: FallbackRange,
    /// Substitute diastolic range (mmHg)
    pub diastolic_fallback: FallbackRange,
}

impl Default for BloodPressureConfig {
    fn default() -> Self {
        Self {
            ready_timeout_ms: 1000,
            tare_settle_ms: 500,
            pump_duration_ms: 3000,
            sample_timeout_ms: 100,
            inter_sample_ms: 30,
            release_settle_ms: 1000,
            min_samples: 10,
            trace_capacity: MAX_TRACE_LEN,
            systolic_offset: 90.0,
            systolic_gain: 0.1,
            diastolic_offset: 60.0,
            diastolic_gain: 0.05,
            forced_gap: 30.0,
            systolic_band: Band::new(90.0, 140.0),
            diastolic_band: Band::new(60.0, 90.0),
            systolic_fallback: FallbackRange::new(110, 130),
            diastolic_fallback: FallbackRange::new(70, 85),
        }
    }
}

/// Complete monitor configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitorConfig {
    /// Device identity, used as session identity and in the topic
    pub device_code: String<MAX_DEVICE_CODE_LEN>,
    /// First topic segment (`/<domain>/<device_code>/data`)
    pub topic_domain: String<MAX_DOMAIN_LEN>,
    /// Blood-pressure scheduling policy
    pub bp_schedule: BpSchedule,
    pub timing: TimingConfig,
    pub sensors: SensorBankConfig,
    pub vitals: VitalsConfig,
    pub blood_pressure: BloodPressureConfig,
    pub link: LinkConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let mut device_code = String::new();
        let _ = device_code.push_str("DEVICE_001");
        let mut topic_domain = String::new();
        let _ = topic_domain.push_str("health_monitor");

        Self {
            device_code,
            topic_domain,
            bp_schedule: BpSchedule::default(),
            timing: TimingConfig::default(),
            sensors: SensorBankConfig::default(),
            vitals: VitalsConfig::default(),
            blood_pressure: BloodPressureConfig::default(),
            link: LinkConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Check the configuration for values the monitor cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_code.trim_matches('/').is_empty() {
            return Err(ConfigError::EmptyDeviceCode);
        }
        Topic::for_device(&self.topic_domain, &self.device_code).map_err(|_| ConfigError::Topic)?;

        let timing = &self.timing;
        if timing.sensor_read_interval_ms == 0 || timing.publish_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.bp_schedule.interval_ms() == Some(0) {
            return Err(ConfigError::ZeroInterval);
        }
        if self.link.transport_poll_interval_ms == 0 || self.link.transport_max_attempts == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        let vitals = &self.vitals;
        if vitals.window_len == 0 || vitals.window_len > MAX_WINDOW_LEN {
            return Err(ConfigError::WindowSize);
        }
        let vitals_ranges_ok = vitals.heart_rate_band.is_ordered()
            && vitals.spo2_band.is_ordered()
            && vitals.temperature_band.is_ordered()
            && vitals.heart_rate_fallback.is_ordered()
            && vitals.spo2_fallback.is_ordered();
        if !vitals_ranges_ok {
            return Err(ConfigError::InvalidRange);
        }

        let bp = &self.blood_pressure;
        if bp.min_samples == 0
            || bp.trace_capacity < bp.min_samples
            || bp.trace_capacity > MAX_TRACE_LEN
        {
            return Err(ConfigError::TraceCapacity);
        }
        let bp_ranges_ok = bp.systolic_band.is_ordered()
            && bp.diastolic_band.is_ordered()
            && bp.systolic_fallback.is_ordered()
            && bp.diastolic_fallback.is_ordered();
        if !bp_ranges_ok {
            return Err(ConfigError::InvalidRange);
        }

        Ok(())
    }
}
