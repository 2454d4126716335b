//! Link layer configuration and credentials

use core::fmt;

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum network name length
pub const MAX_SSID_LEN: usize = 32;

/// Maximum secret / user name length
pub const MAX_SECRET_LEN: usize = 64;

/// Reconnection policy of the two link layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Poll interval while the transport associates (ms)
    pub transport_poll_interval_ms: u32,
    /// Polls before a transport attempt gives up
    pub transport_max_attempts: u32,
    /// Delay between session connect attempts (ms); retried without limit
    pub session_retry_delay_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            transport_poll_interval_ms: 500,
            transport_max_attempts: 20,
            session_retry_delay_ms: 5000,
        }
    }
}

/// Credentials for the transport and session layers
///
/// Kept apart from [`LinkConfig`] so that secrets never reach the log.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkCredentials {
    /// Wireless network name
    pub ssid: String<MAX_SSID_LEN>,
    /// Wireless network passphrase
    pub transport_secret: String<MAX_SECRET_LEN>,
    /// Broker user name
    pub session_user: String<MAX_SECRET_LEN>,
    /// Broker password
    pub session_secret: String<MAX_SECRET_LEN>,
}

impl fmt::Debug for LinkCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkCredentials")
            .field("ssid", &self.ssid)
            .field("transport_secret", &"***")
            .field("session_user", &self.session_user)
            .field("session_secret", &"***")
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LinkCredentials {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "LinkCredentials {{ ssid: {}, session_user: {} }}",
            self.ssid.as_str(),
            self.session_user.as_str()
        );
    }
}
