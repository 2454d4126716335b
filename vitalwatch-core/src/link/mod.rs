//! Transport and session connectivity

pub mod manager;
pub mod state;

pub use manager::{ConnectionStats, ConnectivityManager};
pub use state::{LinkEvent, LinkState};
