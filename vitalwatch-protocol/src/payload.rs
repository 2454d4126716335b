//! Telemetry payload encoding
//!
//! The payload is a flat JSON object serialized into a fixed-size buffer.
//! Values that are not finite are written as `null`.

use heapless::String;
use serde::{Serialize, Serializer};

/// Maximum serialized payload size in bytes
pub const MAX_PAYLOAD_LEN: usize = 512;

/// Buffer holding one serialized payload
pub type PayloadBuffer = String<MAX_PAYLOAD_LEN>;

/// Payload encoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    /// Serialized payload would exceed [`MAX_PAYLOAD_LEN`]
    BufferOverflow,
}

/// One telemetry record as published
///
/// The two blood-pressure fields are set together or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Telemetry<'a> {
    pub device_code: &'a str,
    /// Heart rate (bpm)
    #[serde(serialize_with = "finite_or_null")]
    pub heart_rate: f32,
    /// Oxygen saturation (%)
    #[serde(serialize_with = "finite_or_null")]
    pub spo2: f32,
    /// Body temperature (°C)
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "optional_finite"
    )]
    pub body_temperature: Option<f32>,
    /// Systolic pressure (mmHg)
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "optional_finite"
    )]
    pub bp_systolic: Option<f32>,
    /// Diastolic pressure (mmHg)
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "optional_finite"
    )]
    pub bp_diastolic: Option<f32>,
    /// Acceleration (g)
    #[serde(serialize_with = "finite_or_null")]
    pub accel_x: f32,
    #[serde(serialize_with = "finite_or_null")]
    pub accel_y: f32,
    #[serde(serialize_with = "finite_or_null")]
    pub accel_z: f32,
}

impl<'a> Telemetry<'a> {
    /// Record without the optional fields
    pub fn new(device_code: &'a str, heart_rate: f32, spo2: f32, acceleration: [f32; 3]) -> Self {
        let [accel_x, accel_y, accel_z] = acceleration;
        Self {
            device_code,
            heart_rate,
            spo2,
            body_temperature: None,
            bp_systolic: None,
            bp_diastolic: None,
            accel_x,
            accel_y,
            accel_z,
        }
    }

    pub fn with_body_temperature(mut self, celsius: Option<f32>) -> Self {
        self.body_temperature = celsius;
        self
    }

    /// Set or clear both blood-pressure fields
    pub fn with_blood_pressure(mut self, pressure: Option<(f32, f32)>) -> Self {
        self.bp_systolic = pressure.map(|(systolic, _)| systolic);
        self.bp_diastolic = pressure.map(|(_, diastolic)| diastolic);
        self
    }

    /// Serialize into a bounded JSON object
    pub fn encode(&self) -> Result<PayloadBuffer, PayloadError> {
        serde_json_core::to_string::<_, MAX_PAYLOAD_LEN>(self)
            .map_err(|_| PayloadError::BufferOverflow)
    }
}

fn finite_or_null<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f32(*value)
    } else {
        serializer.serialize_none()
    }
}

fn optional_finite<S: Serializer>(value: &Option<f32>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => finite_or_null(value, serializer),
        None => serializer.serialize_none(),
    }
}
