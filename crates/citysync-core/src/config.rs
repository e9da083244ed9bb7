// ── Runtime gateway configuration ──
//
// Describes *how* to reach the device gateway. The consumer constructs a
// `GatewayConfig` and hands it to `DeviceController::new` -- core never
// reads config files and there is no global base-URL constant.

use std::time::Duration;

use url::Url;

/// Configuration for connecting to a single device gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gateway root URL (e.g., `http://192.168.3.83:8000`).
    pub url: Url,
    /// Per-request timeout. Bounds how long a per-device in-flight
    /// guard can be held by a single operation.
    pub timeout: Duration,
    /// How often the background task re-fetches the full inventory
    /// (seconds). 0 = never poll.
    pub refresh_interval_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000"
                .parse()
                .expect("static default URL is valid"),
            timeout: Duration::from_secs(10),
            refresh_interval_secs: 30,
        }
    }
}
