//! Connectivity manager
//!
//! Owns the transport and session collaborators and applies the two
//! reconnection policies: the transport gives up after a bounded number of
//! polls, the session retries for as long as the transport stays up.
//! Every connection attempt blocks the caller until it resolves.

use heapless::String;

use super::state::{LinkEvent, LinkState};
use crate::config::{LinkConfig, LinkCredentials, MAX_DEVICE_CODE_LEN};
use crate::traits::{Clock, Session, Transport};

/// Connection counters since startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionStats {
    /// Transport connection cycles started
    pub transport_attempts: u32,
    /// Transport re-established after having been up before
    pub transport_reconnects: u32,
    /// Individual session connect calls
    pub session_attempts: u32,
    /// Session re-established after having been up before
    pub session_reconnects: u32,
    /// Time spent with a previously established session down (ms)
    pub session_downtime_ms: u64,
}

/// Transport and session state machines over their collaborators
pub struct ConnectivityManager<T, S> {
    transport: T,
    session: S,
    identity: String<MAX_DEVICE_CODE_LEN>,
    credentials: LinkCredentials,
    config: LinkConfig,
    transport_state: LinkState,
    session_state: LinkState,
    transport_was_up: bool,
    session_was_up: bool,
    session_lost_at: Option<u64>,
    stats: ConnectionStats,
}

impl<T: Transport, S: Session> ConnectivityManager<T, S> {
    /// Create a manager; nothing connects until asked to
    pub fn new(
        transport: T,
        session: S,
        identity: String<MAX_DEVICE_CODE_LEN>,
        credentials: LinkCredentials,
        config: LinkConfig,
    ) -> Self {
        Self {
            transport,
            session,
            identity,
            credentials,
            config,
            transport_state: LinkState::Disconnected,
            session_state: LinkState::Disconnected,
            transport_was_up: false,
            session_was_up: false,
            session_lost_at: None,
            stats: ConnectionStats::default(),
        }
    }

    /// Run one bounded transport connection cycle
    ///
    /// Waits up to `transport_max_attempts` poll intervals for the link,
    /// checking once more after the last wait. Returns `Disconnected` when
    /// the cap is reached; retrying is up to the caller.
    pub fn connect_transport<C: Clock>(&mut self, clock: &mut C) -> LinkState {
        self.transport_state = self.transport_state.transition(LinkEvent::ConnectRequested);
        self.stats.transport_attempts += 1;
        info!("Connecting transport to {}", self.credentials.ssid.as_str());

        self.transport.begin(
            self.credentials.ssid.as_str(),
            self.credentials.transport_secret.as_str(),
        );

        let mut waits = 0;
        while !self.transport.is_up() {
            if waits == self.config.transport_max_attempts {
                warn!("Transport not up after {} polls", waits);
                self.transport_state = self.transport_state.transition(LinkEvent::Failed);
                return self.transport_state;
            }
            clock.sleep_ms(self.config.transport_poll_interval_ms);
            waits += 1;
        }

        self.transport_state = self.transport_state.transition(LinkEvent::Established);
        if self.transport_was_up {
            self.stats.transport_reconnects += 1;
        }
        self.transport_was_up = true;
        info!("Transport connected");
        self.transport_state
    }

    /// Connect the session, retrying without limit
    ///
    /// Never attempted while the transport is down. Each failed connect is
    /// followed by `session_retry_delay_ms`; the loop only ends early if the
    /// transport goes down in between.
    pub fn connect_session<C: Clock>(&mut self, clock: &mut C) -> LinkState {
        if !self.check_transport() {
            debug!("Session connect skipped, transport down");
            return self.session_state;
        }

        self.session_state = self.session_state.transition(LinkEvent::ConnectRequested);
        loop {
            self.stats.session_attempts += 1;
            info!("Connecting session as {}", self.identity.as_str());

            let connected = self.session.connect(
                self.identity.as_str(),
                self.credentials.session_user.as_str(),
                self.credentials.session_secret.as_str(),
            );
            if connected {
                self.session_state = self.session_state.transition(LinkEvent::Established);
                self.on_session_established(clock);
                info!("Session connected");
                return self.session_state;
            }

            warn!(
                "Session connect failed, retrying in {} ms",
                self.config.session_retry_delay_ms
            );
            clock.sleep_ms(self.config.session_retry_delay_ms);

            if !self.check_transport() {
                warn!("Transport lost during session retry");
                self.session_state = self.session_state.transition(LinkEvent::Failed);
                return self.session_state;
            }
        }
    }

    /// Per-iteration connectivity check
    ///
    /// Recovers the transport with one bounded cycle if it is down, then
    /// reconnects the session if it is down, then services session I/O.
    /// Returns the session state.
    pub fn maintain<C: Clock>(&mut self, clock: &mut C) -> LinkState {
        let transport_up = self.check_transport();
        if !transport_up || !self.transport_state.is_connected() {
            if !transport_up {
                self.mark_session_lost(clock);
            }
            if !self.connect_transport(clock).is_connected() {
                return self.session_state;
            }
        }

        if !self.session.is_connected() {
            self.mark_session_lost(clock);
        }
        if !self.session_state.is_connected() {
            self.connect_session(clock);
        }

        if self.session_state.is_connected() {
            self.session.poll();
        }
        self.session_state
    }

    /// Hand a payload to the session; no retry on failure
    pub fn publish(&mut self, topic: &str, payload: &[u8]) -> bool {
        if !self.is_session_up() {
            return false;
        }
        self.session.publish(topic, payload)
    }

    /// Whether a payload can be handed to the session right now
    pub fn is_session_up(&mut self) -> bool {
        self.session_state.is_connected() && self.session.is_connected()
    }

    pub fn transport_state(&self) -> LinkState {
        self.transport_state
    }

    pub fn session_state(&self) -> LinkState {
        self.session_state
    }

    pub fn stats(&self) -> ConnectionStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Query the transport and record a loss of an established link
    fn check_transport(&mut self) -> bool {
        let up = self.transport.is_up();
        if !up && self.transport_state.is_connected() {
            warn!("Transport lost");
            self.transport_state = self.transport_state.transition(LinkEvent::Lost);
        }
        up
    }

    fn mark_session_lost<C: Clock>(&mut self, clock: &C) {
        if self.session_state.is_connected() {
            warn!("Session lost");
            self.session_state = self.session_state.transition(LinkEvent::Lost);
            self.session_lost_at = Some(clock.now_ms());
        }
    }

    fn on_session_established<C: Clock>(&mut self, clock: &C) {
        if self.session_was_up {
            self.stats.session_reconnects += 1;
        }
        self.session_was_up = true;
        if let Some(lost_at) = self.session_lost_at.take() {
            self.stats.session_downtime_ms += clock.elapsed_since(lost_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, MockSession, MockTransport};

    fn credentials() -> LinkCredentials {
        let mut credentials = LinkCredentials::default();
        let _ = credentials.ssid.push_str("ward-3");
        let _ = credentials.transport_secret.push_str("hunter2");
        let _ = credentials.session_user.push_str("monitor");
        let _ = credentials.session_secret.push_str("s3cret");
        credentials
    }

    fn manager(
        transport: MockTransport,
        session: MockSession,
    ) -> ConnectivityManager<MockTransport, MockSession> {
        let mut identity = String::new();
        let _ = identity.push_str("DEVICE_001");
        ConnectivityManager::new(transport, session, identity, credentials(), LinkConfig::default())
    }

    #[test]
    fn test_transport_connects_after_polls() {
        let mut clock = ManualClock::new();
        let mut link = manager(MockTransport::up_after(3), MockSession::accepting());

        assert_eq!(link.connect_transport(&mut clock), LinkState::Connected);
        assert_eq!(clock.now_ms(), 1500);
        assert_eq!(link.transport().begins, 1);
        assert_eq!(link.transport().last_ssid, "ward-3");
        assert_eq!(link.stats().transport_attempts, 1);
    }

    #[test]
    fn test_transport_gives_up_at_cap() {
        let mut clock = ManualClock::new();
        let mut link = manager(MockTransport::never_up(), MockSession::accepting());

        assert_eq!(link.connect_transport(&mut clock), LinkState::Disconnected);
        assert_eq!(clock.now_ms(), 10_000);
        assert_eq!(link.transport().polls, 21);
        assert_eq!(link.transport_state(), LinkState::Disconnected);
    }

    #[test]
    fn test_transport_up_during_last_wait() {
        let mut clock = ManualClock::new();
        let mut link = manager(MockTransport::up_after(20), MockSession::accepting());

        assert_eq!(link.connect_transport(&mut clock), LinkState::Connected);
        assert_eq!(clock.now_ms(), 10_000);

        link.connect_session(&mut clock);
        link.maintain(&mut clock);
        assert_eq!(link.transport().begins, 1);
        assert_eq!(link.stats().transport_attempts, 1);
    }

    #[test]
    fn test_session_never_gives_up() {
        for failures in [0, 1, 7, 25] {
            let mut clock = ManualClock::new();
            let mut link = manager(MockTransport::up(), MockSession::failing(failures));
            link.connect_transport(&mut clock);

            assert_eq!(link.connect_session(&mut clock), LinkState::Connected);
            assert_eq!(link.session().connect_calls, failures + 1);
            assert_eq!(link.session().last_identity, "DEVICE_001");
            assert_eq!(clock.now_ms(), failures as u64 * 5000);
            assert_eq!(link.stats().session_attempts, failures + 1);
        }
    }

    #[test]
    fn test_session_requires_transport() {
        let mut clock = ManualClock::new();
        let mut link = manager(MockTransport::never_up(), MockSession::accepting());

        assert_eq!(link.connect_session(&mut clock), LinkState::Disconnected);
        assert_eq!(link.session().connect_calls, 0);
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn test_session_retry_stops_when_transport_drops() {
        let mut clock = ManualClock::new();
        let mut link = manager(MockTransport::up_for(3), MockSession::failing(100));
        link.connect_transport(&mut clock);

        assert_eq!(link.connect_session(&mut clock), LinkState::Disconnected);
        assert_eq!(link.session().connect_calls, 2);
        assert_eq!(link.transport_state(), LinkState::Disconnected);
    }

    #[test]
    fn test_maintain_polls_connected_session() {
        let mut clock = ManualClock::new();
        let mut link = manager(MockTransport::up(), MockSession::accepting());
        link.connect_transport(&mut clock);
        link.connect_session(&mut clock);

        assert_eq!(link.maintain(&mut clock), LinkState::Connected);
        assert_eq!(link.maintain(&mut clock), LinkState::Connected);
        assert_eq!(link.session().polls, 2);
        assert_eq!(link.session().connect_calls, 1);
    }

    #[test]
    fn test_maintain_reconnects_session() {
        let mut clock = ManualClock::new();
        let mut link = manager(MockTransport::up(), MockSession::accepting());
        link.connect_transport(&mut clock);
        link.connect_session(&mut clock);

        let session = link.session_mut();
        session.connected = false;
        session.failures_before_connect = session.connect_calls + 2;

        assert_eq!(link.maintain(&mut clock), LinkState::Connected);
        let stats = link.stats();
        assert_eq!(stats.session_reconnects, 1);
        assert_eq!(stats.session_attempts, 4);
        assert_eq!(stats.session_downtime_ms, 10_000);
        assert_eq!(link.session().polls, 1);
    }

    #[test]
    fn test_maintain_recovers_transport_first() {
        let mut clock = ManualClock::new();
        let mut link = manager(MockTransport::up(), MockSession::accepting());
        link.connect_transport(&mut clock);
        link.connect_session(&mut clock);

        link.transport_mut().drop_link();
        assert_eq!(link.maintain(&mut clock), LinkState::Disconnected);
        assert!(!link.is_session_up());
        assert!(!link.publish("/t", b"{}"));
        assert_eq!(link.session().connect_calls, 1);
        assert_eq!(link.stats().transport_attempts, 2);

        link.transport_mut().up_after_polls = Some(0);
        link.session_mut().connected = false;
        assert_eq!(link.maintain(&mut clock), LinkState::Connected);
        let stats = link.stats();
        assert_eq!(stats.transport_reconnects, 1);
        assert_eq!(stats.session_reconnects, 1);
        assert_eq!(stats.session_downtime_ms, 10_000);
    }

    #[test]
    fn test_publish_needs_session() {
        let mut clock = ManualClock::new();
        let mut link = manager(MockTransport::up(), MockSession::accepting());
        assert!(!link.publish("/health_monitor/DEVICE_001/data", b"{}"));

        link.connect_transport(&mut clock);
        link.connect_session(&mut clock);
        assert!(link.publish("/health_monitor/DEVICE_001/data", b"{}"));
        assert_eq!(link.session().published.len(), 1);

        link.session_mut().reject_publish = true;
        assert!(!link.publish("/health_monitor/DEVICE_001/data", b"{}"));
    }
}
