//! Simulated wireless transport and broker session

use tracing::{debug, info};
use vitalwatch_core::traits::{Session, Transport};

/// Transport that associates after a fixed number of status polls
#[derive(Debug, Default)]
pub struct SimTransport {
    up_after_polls: u32,
    polls: Option<u32>,
    forced_down: bool,
}

impl SimTransport {
    pub fn new(up_after_polls: u32) -> Self {
        Self {
            up_after_polls,
            polls: None,
            forced_down: false,
        }
    }

    /// Take the link down until [`SimTransport::restore`]
    pub fn drop_link(&mut self) {
        self.forced_down = true;
    }

    pub fn restore(&mut self) {
        self.forced_down = false;
    }
}

impl Transport for SimTransport {
    fn begin(&mut self, ssid: &str, _secret: &str) {
        debug!(ssid, "Associating");
        self.polls = Some(0);
    }

    fn is_up(&mut self) -> bool {
        let Some(polls) = self.polls.as_mut() else {
            return false;
        };
        let up = *polls >= self.up_after_polls && !self.forced_down;
        *polls = polls.saturating_add(1);
        up
    }
}

/// One payload accepted by the simulated broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: String,
}

/// Broker session that refuses a fixed number of connects, then accepts
#[derive(Debug, Default)]
pub struct SimSession {
    failures_remaining: u32,
    connected: bool,
    connect_attempts: u32,
    published: Vec<PublishedMessage>,
}

impl SimSession {
    pub fn new(failures_before_accept: u32) -> Self {
        Self {
            failures_remaining: failures_before_accept,
            ..Default::default()
        }
    }

    /// Drop the connection as if the broker timed it out
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts
    }

    pub fn published(&self) -> &[PublishedMessage] {
        &self.published
    }
}

impl Session for SimSession {
    fn connect(&mut self, identity: &str, user: &str, _secret: &str) -> bool {
        self.connect_attempts += 1;
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            debug!(identity, user, "Broker refused connection");
            return false;
        }
        self.connected = true;
        debug!(identity, user, "Broker accepted connection");
        true
    }

    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool {
        if !self.connected {
            return false;
        }
        let payload = String::from_utf8_lossy(payload).into_owned();
        info!(topic, payload = payload.as_str(), "Broker received");
        self.published.push(PublishedMessage {
            topic: topic.to_owned(),
            payload,
        });
        true
    }

    fn poll(&mut self) {}
}
