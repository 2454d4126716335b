//! Error types for the simulator

use std::path::PathBuf;

use thiserror::Error;
use vitalwatch_core::config::ConfigError;

/// Errors that stop the simulator before the loop starts
#[derive(Error, Debug)]
pub enum SimError {
    /// Configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that was requested
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for the expected layout
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration parsed but cannot be run
    #[error("Invalid configuration: {0:?}")]
    Invalid(ConfigError),
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        SimError::Invalid(err)
    }
}
