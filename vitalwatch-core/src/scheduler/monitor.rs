//! The monitor loop
//!
//! Each iteration runs, in order: connectivity check, operator command
//! poll, scheduled blood-pressure cycle, vitals acquisition and telemetry
//! publish. All timers are compared against the time captured right after
//! the connectivity check, so work done earlier in the iteration does not
//! make later tasks fire early.

use vitalwatch_protocol::{Command, Topic};

use super::platform::{MonitorParts, Platform};
use super::publisher::{PublishOutcome, Publisher};
use super::timer::Interval;
use crate::config::{ConfigError, LinkCredentials, MonitorConfig};
use crate::link::{ConnectionStats, ConnectivityManager, LinkState};
use crate::pressure::{BloodPressureEstimator, BpOutcome};
use crate::traits::{Clock, CommandSource};
use crate::vitals::{
    CycleSummary, HealthReading, SensorAvailability, SensorBank, SensorKind, VitalsEstimator,
};

/// What one loop iteration did
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Session state after the connectivity check
    pub session: LinkState,
    /// Operator command consumed this iteration
    pub command: Option<Command>,
    /// Blood-pressure cycle run this iteration, forced or scheduled
    pub blood_pressure: Option<BpOutcome>,
    /// Vitals acquisition run this iteration
    pub vitals: Option<CycleSummary>,
    /// Publish step run this iteration
    pub publish: Option<PublishOutcome>,
}

/// Vital-signs monitor
///
/// Owns every collaborator and the single [`HealthReading`]. All tasks run
/// on the caller's thread.
pub struct Monitor<H: Platform> {
    config: MonitorConfig,
    bank: SensorBank<H::Pulse, H::Inertial, H::Thermo, H::Pressure>,
    vitals: VitalsEstimator<H::Algorithm, H::Rng>,
    blood_pressure: BloodPressureEstimator<H::Pump, H::Rng>,
    link: ConnectivityManager<H::Transport, H::Session>,
    publisher: Publisher,
    console: H::Console,
    clock: H::Clock,
    reading: HealthReading,
    sensor_timer: Interval,
    publish_timer: Interval,
    bp_timer: Option<Interval>,
}

impl<H: Platform> Monitor<H> {
    /// Validate `config` and assemble the monitor
    pub fn new(
        config: MonitorConfig,
        credentials: LinkCredentials,
        parts: MonitorParts<H>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let topic = Topic::for_device(&config.topic_domain, &config.device_code)
            .map_err(|_| ConfigError::Topic)?;

        let bank = SensorBank::new(
            parts.pulse,
            parts.inertial,
            parts.thermo,
            parts.pressure,
            config.sensors,
        );
        let vitals = VitalsEstimator::new(parts.algorithm, parts.vitals_rng, config.vitals);
        let blood_pressure =
            BloodPressureEstimator::new(parts.pump, parts.bp_rng, config.blood_pressure);
        let link = ConnectivityManager::new(
            parts.transport,
            parts.session,
            config.device_code.clone(),
            credentials,
            config.link,
        );

        Ok(Self {
            bank,
            vitals,
            blood_pressure,
            link,
            publisher: Publisher::new(config.device_code.clone(), topic),
            console: parts.console,
            clock: parts.clock,
            reading: HealthReading::default(),
            sensor_timer: Interval::new(config.timing.sensor_read_interval_ms),
            publish_timer: Interval::new(config.timing.publish_interval_ms),
            bp_timer: config.bp_schedule.interval_ms().map(Interval::new),
            config,
        })
    }

    /// Bring up links and sensors, then take the startup measurement
    ///
    /// The transport gets one bounded attempt; the session is only tried if
    /// the transport came up and then retries until connected. Connectivity
    /// that is still missing is recovered by the loop.
    pub fn setup(&mut self) -> SensorAvailability {
        info!("Monitor {} starting", self.config.device_code.as_str());
        self.blood_pressure.release_pump();

        if self.link.connect_transport(&mut self.clock).is_connected() {
            self.link.connect_session(&mut self.clock);
        }

        let availability = self.bank.init(&mut self.clock);
        info!("{} of 4 sensors available", availability.count());

        if availability.pressure && self.config.bp_schedule.measures_at_startup() {
            self.clock.sleep_ms(self.config.timing.startup_bp_delay_ms);
            self.blood_pressure
                .measure(&mut self.bank, &mut self.clock, &mut self.reading);
            let now = self.clock.now_ms();
            if let Some(timer) = self.bp_timer.as_mut() {
                timer.mark(now);
            }
        }

        availability
    }

    /// Run one loop iteration
    pub fn run_once(&mut self) -> CycleReport {
        let mut report = CycleReport {
            session: self.link.maintain(&mut self.clock),
            ..Default::default()
        };
        let now = self.clock.now_ms();

        report.command = self.console.read_byte().and_then(Command::from_byte);
        if let Some(Command::ForceBloodPressure) = report.command {
            info!("Blood pressure requested by operator");
            report.blood_pressure = Some(self.measure_blood_pressure(now));
        }

        let bp_due = self.bp_timer.is_some_and(|timer| timer.is_due(now));
        if bp_due && self.bank.is_available(SensorKind::Pressure) {
            report.blood_pressure = Some(self.measure_blood_pressure(now));
        }

        if self.sensor_timer.is_due(now) {
            let summary = self
                .vitals
                .acquire(&mut self.bank, &mut self.clock, &mut self.reading);
            report.vitals = Some(summary);
            self.sensor_timer.mark(now);
        }

        if self.publish_timer.is_due(now) {
            report.publish = Some(self.publisher.publish(self.reading, &mut self.link));
            self.publish_timer.mark(now);
        }

        report
    }

    /// Run the loop forever
    pub fn run(&mut self) -> ! {
        loop {
            self.run_once();
        }
    }

    /// Snapshot of the latest reading
    pub fn reading(&self) -> HealthReading {
        self.reading
    }

    pub fn availability(&self) -> SensorAvailability {
        self.bank.availability()
    }

    pub fn link_stats(&self) -> ConnectionStats {
        self.link.stats()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn topic(&self) -> &Topic {
        self.publisher.topic()
    }

    pub fn link(&self) -> &ConnectivityManager<H::Transport, H::Session> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut ConnectivityManager<H::Transport, H::Session> {
        &mut self.link
    }

    pub fn clock(&self) -> &H::Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut H::Clock {
        &mut self.clock
    }

    pub fn console_mut(&mut self) -> &mut H::Console {
        &mut self.console
    }

    pub fn pump(&self) -> &H::Pump {
        self.blood_pressure.pump()
    }

    fn measure_blood_pressure(&mut self, now: u64) -> BpOutcome {
        let outcome = self
            .blood_pressure
            .measure(&mut self.bank, &mut self.clock, &mut self.reading);
        if let Some(timer) = self.bp_timer.as_mut() {
            timer.mark(now);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BpSchedule;
    use crate::scheduler::publisher::SuppressReason;
    use crate::testing::{
        FixedAlgorithm, ManualClock, MockAccel, MockPressure, MockPulse, MockPump, MockSession,
        MockThermo, MockTransport, ScriptedConsole, TestPlatform,
    };
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    struct Rig {
        pulse: MockPulse,
        pressure: MockPressure,
        transport: MockTransport,
        console: ScriptedConsole,
    }

    impl Default for Rig {
        fn default() -> Self {
            Self {
                pulse: MockPulse::with_contact(60_000),
                pressure: MockPressure::ready(&[200.0, 250.0, 300.0]),
                transport: MockTransport::up(),
                console: ScriptedConsole::default(),
            }
        }
    }

    fn monitor(config: MonitorConfig, rig: Rig) -> Monitor<TestPlatform> {
        let parts = MonitorParts {
            pulse: rig.pulse,
            inertial: MockAccel::present([0.0, 0.0, 1.0]),
            thermo: MockThermo::present(36.5),
            pressure: rig.pressure,
            pump: MockPump::default(),
            algorithm: FixedAlgorithm::valid(75, 97),
            vitals_rng: SmallRng::seed_from_u64(1),
            bp_rng: SmallRng::seed_from_u64(2),
            transport: rig.transport,
            session: MockSession::accepting(),
            console: rig.console,
            clock: ManualClock::new(),
        };
        Monitor::new(config, LinkCredentials::default(), parts).unwrap()
    }

    fn schedule(bp_schedule: BpSchedule) -> MonitorConfig {
        MonitorConfig {
            bp_schedule,
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MonitorConfig::default();
        config.timing.sensor_read_interval_ms = 0;
        let parts = MonitorParts::<TestPlatform> {
            pulse: MockPulse::absent(),
            inertial: MockAccel::absent(),
            thermo: MockThermo::absent(),
            pressure: MockPressure::never_ready(),
            pump: MockPump::default(),
            algorithm: FixedAlgorithm::valid(75, 97),
            vitals_rng: SmallRng::seed_from_u64(1),
            bp_rng: SmallRng::seed_from_u64(2),
            transport: MockTransport::up(),
            session: MockSession::accepting(),
            console: ScriptedConsole::default(),
            clock: ManualClock::new(),
        };
        assert!(matches!(
            Monitor::new(config, LinkCredentials::default(), parts),
            Err(ConfigError::ZeroInterval)
        ));
    }

    #[test]
    fn test_setup_measures_at_startup() {
        let mut monitor = monitor(MonitorConfig::default(), Rig::default());

        let availability = monitor.setup();

        assert_eq!(availability.count(), 4);
        assert_eq!(monitor.reading().blood_pressure(), Some((120.0, 70.0)));
        assert_eq!(monitor.pump().switches, [false, true, false]);
        assert_eq!(monitor.link().session_state(), LinkState::Connected);
    }

    #[test]
    fn test_manual_schedule_skips_startup_measurement() {
        let mut monitor = monitor(schedule(BpSchedule::ManualOnly), Rig::default());

        monitor.setup();

        assert_eq!(monitor.reading().blood_pressure(), None);
        assert_eq!(monitor.pump().switches, [false]);
    }

    #[test]
    fn test_startup_measurement_needs_pressure_sensor() {
        let rig = Rig {
            pressure: MockPressure::never_ready(),
            ..Default::default()
        };
        let mut monitor = monitor(schedule(BpSchedule::Once), rig);

        monitor.setup();

        assert_eq!(monitor.reading().blood_pressure(), None);
        assert_eq!(monitor.pump().switches, [false]);
    }

    #[test]
    fn test_first_iteration_acquires_and_publishes() {
        let mut monitor = monitor(MonitorConfig::default(), Rig::default());
        monitor.setup();

        let report = monitor.run_once();

        assert_eq!(report.session, LinkState::Connected);
        assert_eq!(report.command, None);
        assert_eq!(report.blood_pressure, None);
        assert!(report.vitals.is_some());
        assert_eq!(report.publish, Some(PublishOutcome::Sent));

        let reading = monitor.reading();
        assert_eq!(reading.heart_rate, 75.0);
        assert_eq!(reading.spo2, 97.0);

        let session = monitor.link().session();
        assert_eq!(session.published[0].0, "/health_monitor/DEVICE_001/data");
        let payload = session.published_payload(0);
        assert!(payload.contains("\"bp_systolic\":120"));
        assert!(payload.contains("\"body_temperature\":36.5"));
    }

    #[test]
    fn test_tasks_wait_for_their_interval() {
        let mut monitor = monitor(MonitorConfig::default(), Rig::default());
        monitor.setup();
        monitor.run_once();

        let report = monitor.run_once();
        assert_eq!(report.vitals, None);
        assert_eq!(report.publish, None);
        assert_eq!(monitor.link().session().published.len(), 1);

        monitor.clock_mut().advance(2000);
        let report = monitor.run_once();
        assert!(report.vitals.is_some());
        assert_eq!(report.publish, Some(PublishOutcome::Sent));
    }

    #[test]
    fn test_operator_forces_blood_pressure() {
        let rig = Rig {
            console: ScriptedConsole::typed(b"xb"),
            ..Default::default()
        };
        let mut monitor = monitor(schedule(BpSchedule::ManualOnly), rig);
        monitor.setup();

        let report = monitor.run_once();
        assert_eq!(report.command, None);
        assert_eq!(report.blood_pressure, None);

        let report = monitor.run_once();
        assert_eq!(report.command, Some(Command::ForceBloodPressure));
        assert_eq!(
            report.blood_pressure,
            Some(BpOutcome::Measured {
                systolic: 120.0,
                diastolic: 70.0
            })
        );
        assert_eq!(monitor.reading().blood_pressure(), Some((120.0, 70.0)));
    }

    #[test]
    fn test_periodic_blood_pressure() {
        let config = schedule(BpSchedule::Periodic { interval_ms: 10_000 });
        let mut monitor = monitor(config, Rig::default());
        monitor.setup();

        assert_eq!(monitor.run_once().blood_pressure, None);

        monitor.clock_mut().advance(10_000);
        let report = monitor.run_once();
        assert!(matches!(report.blood_pressure, Some(BpOutcome::Measured { .. })));

        assert_eq!(monitor.run_once().blood_pressure, None);
    }

    #[test]
    fn test_no_contact_is_not_published() {
        let rig = Rig {
            pulse: MockPulse::with_contact(10_000),
            ..Default::default()
        };
        let mut monitor = monitor(MonitorConfig::default(), rig);
        monitor.setup();

        let report = monitor.run_once();

        assert_eq!(
            report.publish,
            Some(PublishOutcome::Suppressed(SuppressReason::MissingVitals))
        );
        assert!(monitor.link().session().published.is_empty());
    }

    #[test]
    fn test_loop_recovers_dropped_transport() {
        let mut monitor = monitor(MonitorConfig::default(), Rig::default());
        monitor.setup();
        monitor.link_mut().transport_mut().drop_link();

        let report = monitor.run_once();
        assert_eq!(report.session, LinkState::Disconnected);
        assert_eq!(
            report.publish,
            Some(PublishOutcome::Suppressed(SuppressReason::SessionDown))
        );

        monitor.link_mut().transport_mut().up_after_polls = Some(0);
        monitor.link_mut().session_mut().connected = false;
        let report = monitor.run_once();
        assert_eq!(report.session, LinkState::Connected);
        assert_eq!(monitor.link_stats().transport_reconnects, 1);
    }
}
