//! Session configuration: daemon address, IPC port, and default timeout.

use std::time::Duration;

/// Default server IPC port.
pub const DEFAULT_IPC_PORT: u16 = 54321;

/// Default per-request timeout applied when a caller passes `None` to
/// `Perform`/`Process`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builder-style configuration for a [`crate::session::Session`], covering
/// the handful of fields the daemon IPC boundary actually needs.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    ipc_address: String,
    ipc_port: u16,
    default_timeout: Duration,
}

impl SessionConfig {
    /// `127.0.0.1:54321`, five-second default timeout.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ipc_address(mut self, address: impl Into<String>) -> Self {
        self.ipc_address = address.into();
        self
    }

    pub fn with_ipc_port(mut self, port: u16) -> Self {
        self.ipc_port = port;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn ipc_address(&self) -> &str {
        &self.ipc_address
    }

    pub fn ipc_port(&self) -> u16 {
        self.ipc_port
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub(crate) fn socket_addr(&self) -> (String, u16) {
        (self.ipc_address.clone(), self.ipc_port)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ipc_address: "127.0.0.1".to_string(),
            ipc_port: DEFAULT_IPC_PORT,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Milliseconds, positive — the one timeout type used for Connect, every
/// `Perform`, and observation activation.
///
/// Modelled as signed milliseconds rather than [`Duration`] so a caller can
/// pass a negative value and have it rejected with `OperationInvalid`, which
/// `Duration` cannot represent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeout(i64);

impl Timeout {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn millis(self) -> i64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }

    pub(crate) fn to_duration(self) -> Option<Duration> {
        self.is_valid().then(|| Duration::from_millis(self.0 as u64))
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Self(duration.as_millis() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SessionConfig::new();
        assert_eq!(config.ipc_address(), "127.0.0.1");
        assert_eq!(config.ipc_port(), 54321);
    }

    #[test]
    fn builder_overrides_apply() {
        let config = SessionConfig::new()
            .with_ipc_address("10.0.0.5")
            .with_ipc_port(9999)
            .with_default_timeout(Duration::from_millis(250));
        assert_eq!(config.ipc_address(), "10.0.0.5");
        assert_eq!(config.ipc_port(), 9999);
        assert_eq!(config.default_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn negative_timeout_is_invalid() {
        assert!(!Timeout::from_millis(-1).is_valid());
        assert!(Timeout::from_millis(0).is_valid());
    }
}
