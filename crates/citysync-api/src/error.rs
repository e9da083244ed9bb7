use thiserror::Error;

/// Top-level error type for the `citysync-api` crate.
///
/// Covers every failure mode of a gateway round-trip: connection-level
/// transport errors, timeouts, non-2xx responses, and malformed payloads.
/// `citysync-core` maps these into its domain error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Gateway ─────────────────────────────────────────────────────
    /// Non-2xx response from the gateway, with the response body text.
    #[error("Gateway error (HTTP {status}): {message}")]
    Gateway { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error is a request timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Gateway { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the gateway reported the target as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Gateway { status: 404, .. } => true,
            _ => false,
        }
    }
}
