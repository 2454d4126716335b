//! Publish topic naming
//!
//! Every device publishes to `/<domain>/<device_code>/data`. Leading and
//! trailing slashes on either part are stripped, so `health_monitor/` and
//! `/health_monitor` name the same topic, and the result never ends in `/`.

use core::fmt;

use heapless::String;

/// Maximum topic length in bytes
pub const MAX_TOPIC_LEN: usize = 64;

const TOPIC_LEAF: &str = "data";

/// Topic construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopicError {
    /// Domain or device code is empty after trimming slashes
    Empty,
    /// Topic exceeds [`MAX_TOPIC_LEN`]
    TooLong,
    /// A part contains `/` or a wildcard (`+`, `#`)
    InvalidSegment,
}

/// Normalized per-device telemetry topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    path: String<MAX_TOPIC_LEN>,
}

impl Topic {
    /// Build the topic for `device_code` under `domain`
    pub fn for_device(domain: &str, device_code: &str) -> Result<Self, TopicError> {
        let domain = segment(domain)?;
        let device_code = segment(device_code)?;

        let mut path = String::new();
        for part in [domain, device_code, TOPIC_LEAF] {
            path.push('/').map_err(|_| TopicError::TooLong)?;
            path.push_str(part).map_err(|_| TopicError::TooLong)?;
        }
        Ok(Self { path })
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Topic {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.path.as_str());
    }
}

fn segment(raw: &str) -> Result<&str, TopicError> {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        return Err(TopicError::Empty);
    }
    if trimmed.contains(['/', '+', '#']) {
        return Err(TopicError::InvalidSegment);
    }
    Ok(trimmed)
}
