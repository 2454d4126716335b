//! Mock collaborators shared by the unit tests

use std::collections::VecDeque;
use std::string::{String, ToString};
use std::vec::Vec;

use rand::rngs::SmallRng;

use crate::config::SensorBankConfig;
use crate::scheduler::Platform;
use crate::traits::{
    Accelerometer, Clock, CommandSource, PressureSensor, PulseOximeter, PumpOutput, Session,
    SpO2Algorithm, TemperatureProbe, Transport, WindowEstimate,
};
use crate::vitals::SensorBank;

/// Clock that only advances when slept on
#[derive(Debug, Default)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.now += ms as u64;
    }
}

pub struct MockPulse {
    pub present: bool,
    pub ir_level: u32,
    pub samples_taken: usize,
}

impl MockPulse {
    pub fn with_contact(ir_level: u32) -> Self {
        Self {
            present: true,
            ir_level,
            samples_taken: 0,
        }
    }

    pub fn absent() -> Self {
        Self {
            present: false,
            ir_level: 0,
            samples_taken: 0,
        }
    }
}

impl PulseOximeter for MockPulse {
    fn init(&mut self) -> bool {
        self.present
    }

    fn ir(&mut self) -> u32 {
        self.ir_level
    }

    fn red(&mut self) -> u32 {
        self.ir_level / 2
    }

    fn available(&mut self) -> bool {
        true
    }

    fn check(&mut self) {}

    fn next_sample(&mut self) {
        self.samples_taken += 1;
    }
}

/// Window computation returning a fixed estimate and counting calls
pub struct FixedAlgorithm {
    pub estimate: WindowEstimate,
    pub calls: usize,
    pub last_window_len: usize,
}

impl FixedAlgorithm {
    pub fn valid(heart_rate: i32, spo2: i32) -> Self {
        Self::returning(WindowEstimate {
            heart_rate,
            heart_rate_valid: true,
            spo2,
            spo2_valid: true,
        })
    }

    pub fn returning(estimate: WindowEstimate) -> Self {
        Self {
            estimate,
            calls: 0,
            last_window_len: 0,
        }
    }
}

impl SpO2Algorithm for FixedAlgorithm {
    fn compute(&mut self, ir: &[u32], red: &[u32]) -> WindowEstimate {
        assert_eq!(ir.len(), red.len());
        self.calls += 1;
        self.last_window_len = ir.len();
        self.estimate
    }
}

pub struct MockAccel {
    pub present: bool,
    pub axes: [f32; 3],
}

impl MockAccel {
    pub fn present(axes: [f32; 3]) -> Self {
        Self {
            present: true,
            axes,
        }
    }

    pub fn absent() -> Self {
        Self {
            present: false,
            axes: [0.0; 3],
        }
    }
}

impl Accelerometer for MockAccel {
    fn init(&mut self) -> bool {
        self.present
    }

    fn read_axes(&mut self) -> [f32; 3] {
        self.axes
    }
}

pub struct MockThermo {
    pub present: bool,
    pub celsius: f32,
    pub conversions: usize,
}

impl MockThermo {
    pub fn present(celsius: f32) -> Self {
        Self {
            present: true,
            celsius,
            conversions: 0,
        }
    }

    pub fn absent() -> Self {
        Self {
            present: false,
            celsius: 0.0,
            conversions: 0,
        }
    }
}

impl TemperatureProbe for MockThermo {
    fn begin(&mut self) {}

    fn is_present(&mut self) -> bool {
        self.present
    }

    fn request_conversion(&mut self) {
        self.conversions += 1;
    }

    fn read_celsius(&mut self) -> f32 {
        self.celsius
    }
}

/// Pressure sensor replaying a scripted sample sequence
///
/// The last sample repeats once the script is exhausted.
pub struct MockPressure {
    pub ready: bool,
    pub ready_reads: Option<usize>,
    pub script: Vec<f32>,
    pub cursor: usize,
    pub tares: usize,
}

impl MockPressure {
    pub fn ready(script: &[f32]) -> Self {
        Self {
            ready: true,
            ready_reads: None,
            script: script.to_vec(),
            cursor: 0,
            tares: 0,
        }
    }

    /// Ready until `reads` samples have been taken, then never again
    pub fn ready_for(script: &[f32], reads: usize) -> Self {
        Self {
            ready_reads: Some(reads),
            ..Self::ready(script)
        }
    }

    pub fn never_ready() -> Self {
        Self {
            ready: false,
            ready_reads: None,
            script: Vec::new(),
            cursor: 0,
            tares: 0,
        }
    }
}

impl PressureSensor for MockPressure {
    fn begin(&mut self) {}

    fn is_ready(&mut self) -> bool {
        self.ready && self.ready_reads.map_or(true, |limit| self.cursor < limit)
    }

    fn tare(&mut self) {
        self.tares += 1;
    }

    fn read_units(&mut self) -> f32 {
        let value = self
            .script
            .get(self.cursor)
            .or(self.script.last())
            .copied()
            .unwrap_or(0.0);
        self.cursor += 1;
        value
    }
}

#[derive(Default)]
pub struct MockPump {
    pub on: bool,
    pub switches: Vec<bool>,
}

impl PumpOutput for MockPump {
    fn set_on(&mut self, on: bool) {
        self.on = on;
        self.switches.push(on);
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

/// Transport that comes up after a number of status polls
pub struct MockTransport {
    pub up_after_polls: Option<u32>,
    pub down_after_polls: Option<u32>,
    pub polls: u32,
    pub begins: u32,
    pub last_ssid: String,
}

impl MockTransport {
    pub fn up() -> Self {
        Self::up_after(0)
    }

    pub fn up_after(polls: u32) -> Self {
        Self {
            up_after_polls: Some(polls),
            down_after_polls: None,
            polls: 0,
            begins: 0,
            last_ssid: String::new(),
        }
    }

    pub fn never_up() -> Self {
        Self {
            up_after_polls: None,
            down_after_polls: None,
            polls: 0,
            begins: 0,
            last_ssid: String::new(),
        }
    }

    /// Up for the first `polls` status polls, then down
    pub fn up_for(polls: u32) -> Self {
        Self {
            down_after_polls: Some(polls),
            ..Self::up()
        }
    }

    pub fn drop_link(&mut self) {
        self.up_after_polls = None;
    }
}

impl Transport for MockTransport {
    fn begin(&mut self, ssid: &str, _secret: &str) {
        self.begins += 1;
        self.last_ssid = ssid.to_string();
    }

    fn is_up(&mut self) -> bool {
        let up = matches!(self.up_after_polls, Some(n) if self.polls >= n)
            && self.down_after_polls.map_or(true, |n| self.polls < n);
        self.polls += 1;
        up
    }
}

/// Broker session that fails a scripted number of connects
#[derive(Default)]
pub struct MockSession {
    pub failures_before_connect: u32,
    pub connect_calls: u32,
    pub connected: bool,
    pub reject_publish: bool,
    pub published: Vec<(String, Vec<u8>)>,
    pub polls: u32,
    pub last_identity: String,
}

impl MockSession {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn failing(failures: u32) -> Self {
        Self {
            failures_before_connect: failures,
            ..Default::default()
        }
    }

    pub fn published_payload(&self, index: usize) -> &str {
        std::str::from_utf8(&self.published[index].1).unwrap()
    }
}

impl Session for MockSession {
    fn connect(&mut self, identity: &str, _user: &str, _secret: &str) -> bool {
        self.connect_calls += 1;
        self.last_identity = identity.to_string();
        if self.connect_calls > self.failures_before_connect {
            self.connected = true;
        }
        self.connected
    }

    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool {
        if self.reject_publish || !self.connected {
            return false;
        }
        self.published.push((topic.to_string(), payload.to_vec()));
        true
    }

    fn poll(&mut self) {
        self.polls += 1;
    }
}

#[derive(Default)]
pub struct ScriptedConsole {
    pub pending: VecDeque<u8>,
}

impl ScriptedConsole {
    pub fn typed(bytes: &[u8]) -> Self {
        Self {
            pending: bytes.iter().copied().collect(),
        }
    }
}

impl CommandSource for ScriptedConsole {
    fn read_byte(&mut self) -> Option<u8> {
        self.pending.pop_front()
    }
}

pub type MockBank = SensorBank<MockPulse, MockAccel, MockThermo, MockPressure>;

pub fn bank_with(
    pulse: MockPulse,
    inertial: MockAccel,
    thermo: MockThermo,
    pressure: MockPressure,
) -> MockBank {
    SensorBank::new(pulse, inertial, thermo, pressure, SensorBankConfig::default())
}

/// Platform wired entirely from the mocks above
pub struct TestPlatform;

impl Platform for TestPlatform {
    type Pulse = MockPulse;
    type Inertial = MockAccel;
    type Thermo = MockThermo;
    type Pressure = MockPressure;
    type Pump = MockPump;
    type Algorithm = FixedAlgorithm;
    type Rng = SmallRng;
    type Transport = MockTransport;
    type Session = MockSession;
    type Console = ScriptedConsole;
    type Clock = ManualClock;
}
