// Gateway HTTP client
//
// Wraps `reqwest::Client` with gateway-specific URL construction and
// response handling. All endpoint methods return parsed payloads; non-2xx
// responses surface as `Error::Gateway` with the body text attached.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ActivationAction, CommandAck, SwitchAction, WireDevice, WireDeviceData};
use crate::transport::TransportConfig;

/// Raw HTTP client for the smart-city device gateway.
///
/// The gateway exposes a small REST surface: a device inventory, a
/// per-device data read, and three command endpoints (relay/alarm
/// switching, sensor activation, sampling frequency). All state
/// reconciliation lives in `citysync-core`; this type only moves bytes.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
    // Kept so timeout errors can report the limit that was exceeded.
    timeout: Duration,
}

impl GatewayClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the gateway root, e.g. `http://192.168.3.83:8000`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Timeout errors are reported against the default transport timeout;
    /// if the supplied client uses a different one, build through
    /// [`GatewayClient::new`] instead.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: TransportConfig::default().timeout,
        }
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Full device inventory.
    ///
    /// `GET /devices`
    pub async fn list_devices(&self) -> Result<Vec<WireDevice>, Error> {
        let url = self.endpoint("devices")?;
        debug!("listing devices");
        self.get(url, &[]).await
    }

    /// Per-device telemetry/state read.
    ///
    /// `GET /device/data?device_id={id}`
    pub async fn read_device_data(&self, device_id: &str) -> Result<WireDeviceData, Error> {
        let url = self.endpoint("device/data")?;
        debug!(device_id, "reading device data");
        self.get(url, &[("device_id", device_id)]).await
    }

    /// Switch a relay or alarm on/off.
    ///
    /// `PUT /device/relay?device_id={id}&action=TURN_ON|TURN_OFF`
    pub async fn set_relay_status(
        &self,
        device_id: &str,
        action: SwitchAction,
    ) -> Result<CommandAck, Error> {
        let url = self.endpoint("device/relay")?;
        debug!(device_id, action = action.as_str(), "switching actuator");
        self.put(url, &[("device_id", device_id), ("action", action.as_str())])
            .await
    }

    /// Activate or idle a sensor.
    ///
    /// `PUT /device/sensor/state?device_id={id}&state=TURN_ACTIVE|TURN_IDLE`
    pub async fn set_sensor_activation(
        &self,
        device_id: &str,
        action: ActivationAction,
    ) -> Result<CommandAck, Error> {
        let url = self.endpoint("device/sensor/state")?;
        debug!(device_id, state = action.as_str(), "setting sensor activation");
        self.put(url, &[("device_id", device_id), ("state", action.as_str())])
            .await
    }

    /// Change a sensor's sampling frequency.
    ///
    /// `PUT /device/sensor/frequency?device_id={id}&frequency={ms}`
    pub async fn set_sampling_frequency(
        &self,
        device_id: &str,
        frequency_ms: u32,
    ) -> Result<CommandAck, Error> {
        let url = self.endpoint("device/sensor/frequency")?;
        debug!(device_id, frequency_ms, "setting sampling frequency");
        let freq = frequency_ms.to_string();
        self.put(url, &[("device_id", device_id), ("frequency", freq.as_str())])
            .await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Build a full URL for a gateway path.
    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    /// Send a GET request and parse the JSON response.
    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_err(e))?;

        self.parse_response(resp).await
    }

    /// Send a PUT request (command parameters travel in the query string,
    /// matching the gateway's API) and parse the JSON response.
    async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_err(e))?;

        self.parse_response(resp).await
    }

    /// Classify a low-level reqwest failure. Timeouts get their own
    /// variant carrying the configured limit; everything else passes
    /// through as a transport error.
    fn transport_err(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Check the HTTP status and deserialize the body, keeping the raw
    /// text around for error reporting.
    async fn parse_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_err(e))?;

        if !status.is_success() {
            return Err(Error::Gateway {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
