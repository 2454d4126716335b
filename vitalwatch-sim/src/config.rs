//! Simulator configuration
//!
//! A default `monitor.toml` is embedded at compile time. A file given on
//! the command line replaces it entirely; keys missing from either fall
//! back to the built-in defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vitalwatch_core::config::{LinkCredentials, MonitorConfig};

use crate::error::SimError;

/// Configuration embedded in the binary
pub const EMBEDDED_CONFIG: &str = include_str!("../monitor.toml");

/// Which simulated sensors answer during probing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSensors {
    pub pulse_oximeter: bool,
    pub inertial: bool,
    pub temperature: bool,
    pub pressure: bool,
}

impl Default for SimSensors {
    fn default() -> Self {
        Self {
            pulse_oximeter: true,
            inertial: true,
            temperature: true,
            pressure: true,
        }
    }
}

/// Behavior of the simulated patient and link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Noise seed; random when absent
    pub seed: Option<u64>,
    /// Stop after this many loop iterations; run forever when absent
    pub iterations: Option<u64>,
    pub heart_rate_bpm: f32,
    pub spo2_percent: f32,
    pub body_temperature_c: f32,
    /// Whether the finger is on the pulse oximeter
    pub skin_contact: bool,
    pub sensors: SimSensors,
    /// Status polls before the transport reports up
    pub transport_up_after_polls: u32,
    /// Session connects refused before the broker accepts
    pub session_failures: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            iterations: None,
            heart_rate_bpm: 72.0,
            spo2_percent: 97.0,
            body_temperature_c: 36.6,
            skin_contact: true,
            sensors: SimSensors::default(),
            transport_up_after_polls: 2,
            session_failures: 1,
        }
    }
}

/// Complete simulator configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub monitor: MonitorConfig,
    pub credentials: LinkCredentials,
    pub simulation: SimulationConfig,
}

impl SimConfig {
    /// Parse and validate a TOML document
    pub fn parse(toml_str: &str) -> Result<Self, SimError> {
        let config: SimConfig = toml::from_str(toml_str)?;
        config.monitor.validate()?;
        Ok(config)
    }

    /// Load `path`, or the embedded configuration when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self, SimError> {
        let config = match path {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration");
                let toml_str = fs::read_to_string(path).map_err(|source| SimError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::parse(&toml_str)?
            }
            None => {
                debug!("Using embedded configuration");
                Self::parse(EMBEDDED_CONFIG)?
            }
        };

        log_config_summary(&config);
        Ok(config)
    }
}

fn log_config_summary(config: &SimConfig) {
    let monitor = &config.monitor;
    info!(
        device_code = monitor.device_code.as_str(),
        bp_schedule = ?monitor.bp_schedule,
        sensor_read_interval_ms = monitor.timing.sensor_read_interval_ms,
        publish_interval_ms = monitor.timing.publish_interval_ms,
        "Monitor configuration"
    );
    debug!(credentials = ?config.credentials, simulation = ?config.simulation, "Simulation setup");
}
