//! Link layer state machine
//!
//! The transport and the session each run their own copy of this machine.

/// Connection state of one link layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    #[default]
    Disconnected,
    /// Connection attempt in progress
    Connecting,
    Connected,
}

/// Events driving a link layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Caller started a connection attempt
    ConnectRequested,
    /// Underlying layer reported the link up
    Established,
    /// Connection attempt gave up
    Failed,
    /// An established link went down
    Lost,
}

impl LinkState {
    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: LinkEvent) -> Self {
        use LinkEvent::*;
        use LinkState::*;

        match (self, event) {
            (Disconnected, ConnectRequested) => Connecting,

            (Connecting, Established) => Connected,
            (Connecting, Failed) => Disconnected,

            (Connected, Lost) => Disconnected,
            // Forced reconnect of a link that still reports up
            (Connected, ConnectRequested) => Connecting,

            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_cycle() {
        let state = LinkState::default()
            .transition(LinkEvent::ConnectRequested)
            .transition(LinkEvent::Established);
        assert_eq!(state, LinkState::Connected);
        assert_eq!(state.transition(LinkEvent::Lost), LinkState::Disconnected);
    }

    #[test]
    fn test_failed_attempt_reverts() {
        let state = LinkState::Disconnected.transition(LinkEvent::ConnectRequested);
        assert_eq!(state, LinkState::Connecting);
        assert_eq!(state.transition(LinkEvent::Failed), LinkState::Disconnected);
    }

    #[test]
    fn test_ignored_events() {
        assert_eq!(
            LinkState::Disconnected.transition(LinkEvent::Established),
            LinkState::Disconnected
        );
        assert_eq!(
            LinkState::Disconnected.transition(LinkEvent::Lost),
            LinkState::Disconnected
        );
        assert_eq!(
            LinkState::Connected.transition(LinkEvent::Failed),
            LinkState::Connected
        );
        assert_eq!(
            LinkState::Connecting.transition(LinkEvent::ConnectRequested),
            LinkState::Connecting
        );
    }
}
