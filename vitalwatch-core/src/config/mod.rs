//! Configuration types
//!
//! Board-agnostic configuration structures. Every timing constant and
//! plausibility band used by the monitor has its default here.

pub mod link;
pub mod types;

pub use link::*;
pub use types::*;
