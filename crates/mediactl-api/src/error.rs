use thiserror::Error;

/// Top-level error type for the `mediactl-api` crate.
///
/// Covers every failure mode across both API surfaces: the settings
/// endpoints and the server-sent event stream. `mediactl-core` maps these
/// into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The bearer token was rejected (expired, revoked, or malformed).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The account behind the token lacks the required permission.
    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server ──────────────────────────────────────────────────────
    /// Non-2xx response outside the auth cases above.
    #[error("Server error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Event stream ────────────────────────────────────────────────
    /// The event stream connection could not be established.
    #[error("Event stream connection failed: {0}")]
    StreamConnect(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the credential was rejected
    /// and obtaining a fresh token might resolve it.
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Forbidden { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::StreamConnect(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
