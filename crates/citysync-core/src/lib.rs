// citysync-core: Device state synchronization layer between citysync-api
// and consumers (dashboards, CLIs).
//
// Two components: `DeviceStore` holds the canonical client-side snapshot
// of all known devices; `DeviceController` mediates every state-changing
// intent into exactly one validated, non-duplicated gateway call, applies
// optimistic updates, and reconciles the result back into the store.

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::GatewayConfig;
pub use controller::DeviceController;
pub use error::{CoreError, FailureReason};
pub use store::DeviceStore;
pub use stream::DeviceStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Device, DeviceId, DeviceKind, DevicePatch, DeviceStatus, TelemetrySnapshot,
    SAMPLING_INTERVAL_MS_MAX, SAMPLING_INTERVAL_MS_MIN,
};
