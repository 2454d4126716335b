//! Vitalwatch simulator
//!
//! Usage: `vitalwatch-sim [CONFIG.toml]`
//!
//! Type `b` and Enter to force a blood-pressure measurement. Log verbosity
//! follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vitalwatch_core::scheduler::Monitor;
use vitalwatch_core::traits::Clock;
use vitalwatch_sim::{build_parts, wall_clock, SimConfig, SimError, StdinConsole};

/// Pause between loop iterations so the host loop does not spin
const IDLE_SLEEP_MS: u32 = 10;

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = SimConfig::load(path.as_deref())?;
    let simulation = config.simulation.clone();

    let parts = build_parts(&simulation, wall_clock(), StdinConsole::spawn());
    let mut monitor = Monitor::new(config.monitor, config.credentials, parts)?;
    info!(topic = %monitor.topic(), "Monitor assembled");

    let availability = monitor.setup();
    info!(?availability, "Setup complete");

    let mut iterations = 0u64;
    loop {
        let report = monitor.run_once();
        if report.vitals.is_some() || report.publish.is_some() || report.blood_pressure.is_some() {
            debug!(?report, reading = ?monitor.reading(), "Iteration");
        }

        iterations += 1;
        if simulation.iterations.is_some_and(|limit| iterations >= limit) {
            break;
        }
        monitor.clock_mut().sleep_ms(IDLE_SLEEP_MS);
    }

    info!(iterations, stats = ?monitor.link_stats(), "Simulation finished");
    Ok(())
}
