//! Board-agnostic core logic for the vital-signs monitor
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (sensors, pump, link layers, console, clock)
//! - Sensor bank and vitals estimation
//! - Blood-pressure cuff sequence and estimation
//! - Connectivity state machines with reconnection policy
//! - Cooperative scheduler and telemetry publisher
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

mod fmt;

pub mod config;
pub mod link;
pub mod pressure;
pub mod scheduler;
pub mod traits;
pub mod vitals;

#[cfg(test)]
pub(crate) mod testing;
