//! Cooperative monitor loop
//!
//! One thread runs every task. Each task is gated by its own interval and
//! blocking work (cuff sequence, reconnection, pulse windows) delays the
//! tasks behind it; late tasks run on the next check and are never
//! compensated.

pub mod monitor;
pub mod platform;
pub mod publisher;
pub mod timer;

pub use monitor::{CycleReport, Monitor};
pub use platform::{MonitorParts, Platform};
pub use publisher::{PublishOutcome, Publisher, SuppressReason};
pub use timer::Interval;
