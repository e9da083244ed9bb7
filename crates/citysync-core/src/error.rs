// ── Core error types ──
//
// User-facing errors from citysync-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<citysync_api::Error>`
// impl folds transport-layer failures into a `FailureReason` carried by
// the read/write error variants.
//
// Contract: `InvalidInput` and `AlreadyInFlight` are returned
// synchronously with no side effects; `CommandFailed` is only surfaced
// after the optimistic write has been rolled back; `FetchFailed` leaves
// the store untouched.

use thiserror::Error;

use crate::model::DeviceId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Synchronous rejections (no network, no store mutation) ──────
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Operation already in flight for device {device_id}")]
    AlreadyInFlight { device_id: DeviceId },

    // ── Data errors ─────────────────────────────────────────────────
    #[error("Unknown device: {device_id}")]
    UnknownDevice { device_id: DeviceId },

    // ── Operation errors ────────────────────────────────────────────
    /// A read operation failed; the store retains its last-known-good state.
    #[error("Fetch failed: {reason}")]
    FetchFailed { reason: FailureReason },

    /// A write operation failed after an optimistic update; the store has
    /// been rolled back to its pre-operation value.
    #[error("Command failed for device {device_id}: {reason}")]
    CommandFailed {
        device_id: DeviceId,
        reason: FailureReason,
    },

    // ── Configuration errors ────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Why a gateway round-trip failed.
///
/// Timeout is a reason, not a distinct error: a timed-out command rolls
/// back and surfaces as `CommandFailed` exactly like any other failure.
#[derive(Debug, Clone, Error)]
pub enum FailureReason {
    #[error("timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("transport: {message}")]
    Transport { message: String },

    #[error("gateway rejected the request (HTTP {status}): {message}")]
    Gateway { status: u16, message: String },

    #[error("malformed payload: {message}")]
    Payload { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<citysync_api::Error> for FailureReason {
    fn from(err: citysync_api::Error) -> Self {
        match err {
            citysync_api::Error::Timeout { timeout_secs } => {
                FailureReason::Timeout { timeout_secs }
            }
            // The api layer classifies timeouts before they ever reach a
            // `Transport` value, so no `is_timeout` sniffing here.
            citysync_api::Error::Transport(e) => FailureReason::Transport {
                message: e.to_string(),
            },
            citysync_api::Error::InvalidUrl(e) => FailureReason::Transport {
                message: format!("invalid URL: {e}"),
            },
            citysync_api::Error::Gateway { status, message } => {
                FailureReason::Gateway { status, message }
            }
            citysync_api::Error::Deserialization { message, body: _ } => {
                FailureReason::Payload { message }
            }
        }
    }
}

impl CoreError {
    /// Wrap an API error as a failed read.
    pub(crate) fn fetch(err: citysync_api::Error) -> Self {
        CoreError::FetchFailed { reason: err.into() }
    }

    /// Wrap an API error as a failed command against `device_id`.
    pub(crate) fn command(device_id: DeviceId, err: citysync_api::Error) -> Self {
        CoreError::CommandFailed {
            device_id,
            reason: err.into(),
        }
    }
}
