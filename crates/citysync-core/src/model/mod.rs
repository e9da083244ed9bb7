// ── Domain model ──

mod device;
mod device_id;

pub use device::{
    Device, DeviceKind, DevicePatch, DeviceStatus, TelemetrySnapshot,
    SAMPLING_INTERVAL_MS_MAX, SAMPLING_INTERVAL_MS_MIN,
};
pub use device_id::DeviceId;
