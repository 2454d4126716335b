//! Blood-pressure cuff sequence and estimation

pub mod estimator;
pub mod trace;

pub use estimator::{BloodPressureEstimator, BpEstimate, BpOutcome};
pub use trace::{PressureTrace, MAX_TRACE_LEN};
