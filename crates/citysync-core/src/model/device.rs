// ── Device domain types ──
//
// The gateway's device shape is duck-typed (presence of `is_sensor`,
// optional fields). We resolve it once at fetch time into a tagged kind
// with a status domain that depends on the kind: actuators are ON/OFF,
// sensors are ACTIVE/IDLE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::device_id::DeviceId;

/// Lower bound for a sensor's sampling interval, in milliseconds.
pub const SAMPLING_INTERVAL_MS_MIN: u32 = 1_000;
/// Upper bound for a sensor's sampling interval, in milliseconds.
pub const SAMPLING_INTERVAL_MS_MAX: u32 = 60_000;

/// Canonical device type, normalized from the gateway's type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DeviceKind {
    Relay,
    TemperatureSensor,
    Alarm,
    Other,
}

impl DeviceKind {
    /// The status a device of this kind falls back to when the gateway
    /// reports nothing usable.
    pub fn quiescent_status(self, is_sensor: bool) -> DeviceStatus {
        if is_sensor {
            DeviceStatus::Idle
        } else {
            match self {
                Self::TemperatureSensor => DeviceStatus::Idle,
                Self::Relay | Self::Alarm | Self::Other => DeviceStatus::Off,
            }
        }
    }
}

/// Device operational status.
///
/// The valid domain depends on the device kind: `On`/`Off` for relays
/// and alarms, `Active`/`Idle` for sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    On,
    Off,
    Active,
    Idle,
}

impl DeviceStatus {
    /// The logical complement within the status domain: ON↔OFF, ACTIVE↔IDLE.
    pub fn complement(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
            Self::Active => Self::Idle,
            Self::Idle => Self::Active,
        }
    }

    /// Whether this status belongs to the sensor domain (`Active`/`Idle`).
    pub fn is_sensor_status(self) -> bool {
        matches!(self, Self::Active | Self::Idle)
    }

    /// Parse the gateway's upper-snake wire form.
    pub fn parse_wire(raw: &str) -> Option<Self> {
        match raw {
            "ON" => Some(Self::On),
            "OFF" => Some(Self::Off),
            "ACTIVE" => Some(Self::Active),
            "IDLE" => Some(Self::Idle),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::Active => "ACTIVE",
            Self::Idle => "IDLE",
        }
    }
}

/// Last-read telemetry from a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub read_at: DateTime<Utc>,
}

/// A device record: the client-side view of one gateway endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub kind: DeviceKind,
    pub status: DeviceStatus,
    pub is_sensor: bool,
    /// Sampling interval in milliseconds. Sensors only; always within
    /// [`SAMPLING_INTERVAL_MS_MIN`, `SAMPLING_INTERVAL_MS_MAX`] when present.
    pub sampling_interval_ms: Option<u32>,
    pub telemetry: Option<TelemetrySnapshot>,
}

impl Device {
    /// Whether `status` is inside the domain valid for this device.
    pub fn status_valid(&self, status: DeviceStatus) -> bool {
        status.is_sensor_status() == self.is_sensor
    }
}

// ── Partial updates ──────────────────────────────────────────────────

/// A partial update merged into an existing device record by
/// `DeviceStore::apply_patch`. Unset fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct DevicePatch {
    pub(crate) status: Option<DeviceStatus>,
    pub(crate) sampling_interval_ms: Option<Option<u32>>,
    pub(crate) telemetry: Option<TelemetrySnapshot>,
}

impl DevicePatch {
    /// Patch the status field.
    pub fn status(status: DeviceStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Patch the sampling interval. `None` clears the field (used when
    /// rolling back a device that never reported an interval).
    pub fn sampling_interval(interval_ms: Option<u32>) -> Self {
        Self {
            sampling_interval_ms: Some(interval_ms),
            ..Self::default()
        }
    }

    /// Patch the telemetry snapshot.
    pub fn telemetry(snapshot: TelemetrySnapshot) -> Self {
        Self {
            telemetry: Some(snapshot),
            ..Self::default()
        }
    }

    /// Produce the merged record.
    pub(crate) fn apply_to(&self, device: &Device) -> Device {
        let mut updated = device.clone();
        if let Some(status) = self.status {
            updated.status = status;
        }
        if let Some(interval) = self.sampling_interval_ms {
            updated.sampling_interval_ms = interval;
        }
        if let Some(telemetry) = self.telemetry {
            updated.telemetry = Some(telemetry);
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_is_an_involution() {
        for status in [
            DeviceStatus::On,
            DeviceStatus::Off,
            DeviceStatus::Active,
            DeviceStatus::Idle,
        ] {
            assert_eq!(status.complement().complement(), status);
            assert_ne!(status.complement(), status);
        }
    }

    #[test]
    fn complement_stays_within_its_domain() {
        assert_eq!(DeviceStatus::On.complement(), DeviceStatus::Off);
        assert_eq!(DeviceStatus::Active.complement(), DeviceStatus::Idle);
        assert!(DeviceStatus::Active.complement().is_sensor_status());
        assert!(!DeviceStatus::On.complement().is_sensor_status());
    }

    #[test]
    fn wire_round_trip() {
        for raw in ["ON", "OFF", "ACTIVE", "IDLE"] {
            let parsed = DeviceStatus::parse_wire(raw).expect("known wire form");
            assert_eq!(parsed.as_str(), raw);
        }
        assert!(DeviceStatus::parse_wire("BLINKING").is_none());
    }

    #[test]
    fn patch_merges_only_set_fields() {
        let device = Device {
            id: DeviceId::from("sensor-1"),
            kind: DeviceKind::TemperatureSensor,
            status: DeviceStatus::Active,
            is_sensor: true,
            sampling_interval_ms: Some(5_000),
            telemetry: None,
        };

        let patched = DevicePatch::status(DeviceStatus::Idle).apply_to(&device);
        assert_eq!(patched.status, DeviceStatus::Idle);
        assert_eq!(patched.sampling_interval_ms, Some(5_000));

        let patched = DevicePatch::sampling_interval(Some(2_000)).apply_to(&device);
        assert_eq!(patched.status, DeviceStatus::Active);
        assert_eq!(patched.sampling_interval_ms, Some(2_000));

        let patched = DevicePatch::sampling_interval(None).apply_to(&device);
        assert_eq!(patched.sampling_interval_ms, None);
    }
}
