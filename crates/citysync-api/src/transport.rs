// Shared transport configuration for building reqwest::Client instances.
//
// The gateway speaks plain HTTP on the local network, so there is no TLS
// or cookie handling here -- just the request timeout, which is mandatory:
// every call must resolve in bounded time so callers holding per-device
// guards are never blocked indefinitely.

use std::time::Duration;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. Applies to every gateway call.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("citysync/0.1.0")
            .build()
            .map_err(crate::error::Error::Transport)
    }
}
