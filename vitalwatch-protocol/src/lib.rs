//! Vitalwatch telemetry protocol
//!
//! Wire-level pieces shared between the monitor and its backend:
//!
//! - [`payload`]: the telemetry record, serialized as a flat JSON object of
//!   at most [`MAX_PAYLOAD_LEN`] bytes
//! - [`topic`]: the per-device publish topic, `/<domain>/<device_code>/data`
//! - [`command`]: single-byte operator commands read from the console
//!
//! ```text
//! {"device_code":"DEVICE_001","heart_rate":75.0,"spo2":97.0,
//!  "body_temperature":36.6,"bp_systolic":120.0,"bp_diastolic":80.0,
//!  "accel_x":0.01,"accel_y":-0.02,"accel_z":0.98}
//! ```
//!
//! `body_temperature` is present only when the probe produced a plausible
//! value; the two blood-pressure fields are present together or not at all.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod payload;
pub mod topic;

pub use command::Command;
pub use payload::{PayloadBuffer, PayloadError, Telemetry, MAX_PAYLOAD_LEN};
pub use topic::{Topic, TopicError, MAX_TOPIC_LEN};
