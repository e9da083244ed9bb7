// ── API-to-domain type conversions ──
//
// Bridges raw `citysync_api` wire types into canonical domain types.
// The gateway's device shape is duck-typed; conversion resolves it once,
// at fetch time, so nothing downstream re-checks `is_sensor` against
// string status tags.

use citysync_api::WireDevice;

use crate::model::{Device, DeviceId, DeviceKind, DeviceStatus};

/// Infer `DeviceKind` from the gateway's upper-snake type tag.
///
/// Unknown tags fall back to `Other`; the `is_sensor` flag still decides
/// which status domain such a device lives in.
fn infer_kind(device_type: &str) -> DeviceKind {
    match device_type {
        "RELAY" => DeviceKind::Relay,
        "TEMPERATURE_SENSOR" | "TEMPERATURE_HUMIDITY_SENSOR" => DeviceKind::TemperatureSensor,
        "ALARM" => DeviceKind::Alarm,
        _ => DeviceKind::Other,
    }
}

/// Resolve the reported status string against the device's domain.
///
/// A status outside the domain valid for the device (e.g. `ON` reported
/// for a sensor) is treated as unusable and replaced by the kind's
/// quiescent default, same as a missing status.
fn resolve_status(raw: Option<&str>, kind: DeviceKind, is_sensor: bool) -> DeviceStatus {
    raw.and_then(DeviceStatus::parse_wire)
        .filter(|s| s.is_sensor_status() == is_sensor)
        .unwrap_or_else(|| kind.quiescent_status(is_sensor))
}

impl From<WireDevice> for Device {
    fn from(wire: WireDevice) -> Self {
        let kind = infer_kind(&wire.device_type);
        let status = resolve_status(wire.status.as_deref(), kind, wire.is_sensor);

        Device {
            id: DeviceId::from(wire.id),
            kind,
            status,
            is_sensor: wire.is_sensor,
            // Not part of the inventory payload; filled in by the first
            // telemetry read or interval change.
            sampling_interval_ms: None,
            telemetry: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(device_type: &str, status: Option<&str>, is_sensor: bool) -> WireDevice {
        WireDevice {
            id: "dev-1".into(),
            device_type: device_type.into(),
            ip: None,
            port: None,
            status: status.map(str::to_owned),
            is_sensor,
            is_actuator: !is_sensor,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn relay_converts_with_reported_status() {
        let device = Device::from(wire("RELAY", Some("ON"), false));
        assert_eq!(device.kind, DeviceKind::Relay);
        assert_eq!(device.status, DeviceStatus::On);
        assert!(!device.is_sensor);
    }

    #[test]
    fn sensor_converts_with_reported_status() {
        let device = Device::from(wire("TEMPERATURE_SENSOR", Some("ACTIVE"), true));
        assert_eq!(device.kind, DeviceKind::TemperatureSensor);
        assert_eq!(device.status, DeviceStatus::Active);
        assert!(device.is_sensor);
    }

    #[test]
    fn out_of_domain_status_falls_back_to_quiescent() {
        // Gateway bug: sensor reporting an actuator status.
        let device = Device::from(wire("TEMPERATURE_SENSOR", Some("ON"), true));
        assert_eq!(device.status, DeviceStatus::Idle);

        let device = Device::from(wire("ALARM", Some("ACTIVE"), false));
        assert_eq!(device.status, DeviceStatus::Off);
    }

    #[test]
    fn unknown_type_tag_becomes_other() {
        let device = Device::from(wire("SPRINKLER", None, false));
        assert_eq!(device.kind, DeviceKind::Other);
        assert_eq!(device.status, DeviceStatus::Off);
    }
}
