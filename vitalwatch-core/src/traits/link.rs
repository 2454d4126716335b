//! Network and console collaborator traits

/// Wireless link layer (association and address acquisition)
pub trait Transport {
    /// Start associating with the given network
    ///
    /// Returns immediately; progress is observed through [`Transport::is_up`].
    fn begin(&mut self, ssid: &str, secret: &str);

    /// Whether the link is associated and has an address
    fn is_up(&mut self) -> bool;
}

/// Publish-subscribe broker session layered on the transport
pub trait Session {
    /// Open a session with the broker
    fn connect(&mut self, identity: &str, user: &str, secret: &str) -> bool;

    /// Whether the broker session is open
    fn is_connected(&mut self) -> bool;

    /// Publish a payload; `false` means the message was not accepted
    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool;

    /// Service inbound/outbound traffic and keepalives
    ///
    /// Must be called on every scheduler iteration.
    fn poll(&mut self);
}

/// Operator console delivering single-character commands
pub trait CommandSource {
    /// Take the next pending byte, if any, without blocking
    fn read_byte(&mut self) -> Option<u8>;
}
