//! Telemetry publisher
//!
//! Builds the payload from a reading snapshot and hands it to the session.
//! A failed publish is dropped; the next period carries fresher data.

use heapless::String;
use vitalwatch_protocol::{Telemetry, Topic};

use crate::config::MAX_DEVICE_CODE_LEN;
use crate::link::ConnectivityManager;
use crate::traits::{Session, Transport};
use crate::vitals::HealthReading;

/// Why a publish was not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SuppressReason {
    SessionDown,
    /// Last acquisition cycle did not complete
    InvalidReading,
    /// Heart rate or SpO2 not above zero
    MissingVitals,
    /// Encoded payload exceeded the buffer
    PayloadTooLarge,
}

/// Result of one publish step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishOutcome {
    /// Session accepted the payload
    Sent,
    /// Session refused the payload; not retried
    Rejected,
    /// Publish not attempted
    Suppressed(SuppressReason),
}

/// Publishes reading snapshots for one device
pub struct Publisher {
    device_code: String<MAX_DEVICE_CODE_LEN>,
    topic: Topic,
}

impl Publisher {
    pub fn new(device_code: String<MAX_DEVICE_CODE_LEN>, topic: Topic) -> Self {
        Self { device_code, topic }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Telemetry record for `reading`
    ///
    /// Temperature is included only when above zero, blood pressure only
    /// once a cuff measurement has completed.
    pub fn telemetry(&self, reading: &HealthReading) -> Telemetry<'_> {
        Telemetry::new(
            self.device_code.as_str(),
            reading.heart_rate,
            reading.spo2,
            reading.acceleration,
        )
        .with_body_temperature(reading.body_temperature_c())
        .with_blood_pressure(reading.blood_pressure())
    }

    /// Publish `snapshot` if the session is up and the core vitals are present
    pub fn publish<T: Transport, S: Session>(
        &self,
        snapshot: HealthReading,
        link: &mut ConnectivityManager<T, S>,
    ) -> PublishOutcome {
        let outcome = self.try_publish(&snapshot, link);
        match outcome {
            PublishOutcome::Sent => {}
            PublishOutcome::Rejected => warn!("Publish to {} rejected", self.topic.as_str()),
            PublishOutcome::Suppressed(reason) => debug!("Publish suppressed: {:?}", reason),
        }
        outcome
    }

    fn try_publish<T: Transport, S: Session>(
        &self,
        snapshot: &HealthReading,
        link: &mut ConnectivityManager<T, S>,
    ) -> PublishOutcome {
        if !link.is_session_up() {
            return PublishOutcome::Suppressed(SuppressReason::SessionDown);
        }
        if !snapshot.valid {
            return PublishOutcome::Suppressed(SuppressReason::InvalidReading);
        }
        if !snapshot.has_core_vitals() {
            return PublishOutcome::Suppressed(SuppressReason::MissingVitals);
        }

        let Ok(payload) = self.telemetry(snapshot).encode() else {
            return PublishOutcome::Suppressed(SuppressReason::PayloadTooLarge);
        };

        debug!("Publishing {}", payload.as_str());
        if link.publish(self.topic.as_str(), payload.as_bytes()) {
            PublishOutcome::Sent
        } else {
            PublishOutcome::Rejected
        }
    }
}
