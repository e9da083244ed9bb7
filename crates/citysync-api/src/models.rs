// Gateway wire types
//
// Models for the gateway's JSON payloads. Fields use `#[serde(default)]`
// liberally because the gateway is inconsistent about field presence
// across device types and firmware revisions.

use serde::{Deserialize, Serialize};

// ── Device inventory ─────────────────────────────────────────────────

/// Device descriptor from `GET /devices`.
///
/// The shape is duck-typed on the gateway side: sensors carry
/// `is_sensor: true` and report `ACTIVE`/`IDLE` statuses, actuators
/// report `ON`/`OFF`. Anything we don't model lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDevice {
    pub id: String,
    /// Upper-snake type tag: `RELAY`, `TEMPERATURE_SENSOR`, `ALARM`, ...
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    /// Initial status as reported at registration: `ON`, `OFF`, `ACTIVE`, `IDLE`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_sensor: bool,
    #[serde(default)]
    pub is_actuator: bool,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Per-device read from `GET /device/data`.
///
/// Sensors report telemetry plus their current sampling frequency;
/// actuators report status only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDeviceData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub frequency_ms: Option<u64>,
    #[serde(default)]
    pub custom_config_status: Option<String>,
}

// ── Command payloads ─────────────────────────────────────────────────

/// Acknowledgement from a `PUT` command endpoint.
///
/// The gateway's ack shape varies by endpoint; every field is optional.
/// When `status` is present it carries the server-confirmed device
/// status after the command was applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// On/off action for relays and alarms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchAction {
    TurnOn,
    TurnOff,
}

impl SwitchAction {
    /// Wire form expected by the gateway's `action` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TurnOn => "TURN_ON",
            Self::TurnOff => "TURN_OFF",
        }
    }
}

/// Activation action for sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationAction {
    TurnActive,
    TurnIdle,
}

impl ActivationAction {
    /// Wire form expected by the gateway's `state` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TurnActive => "TURN_ACTIVE",
            Self::TurnIdle => "TURN_IDLE",
        }
    }
}
