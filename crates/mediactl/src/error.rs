//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use mediactl_config::ConfigError;
use mediactl_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const SAVE_FAILED: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the server at {url}")]
    #[diagnostic(
        code(mediactl::connection_failed),
        help(
            "Check that the media server is running and its web interface is enabled.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(mediactl::auth_failed),
        help(
            "The bearer token was rejected.\n\
             Update it with: mediactl config set-token --token <TOKEN>"
        )
    )]
    AuthFailed,

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(mediactl::permission_denied),
        help("The account behind this token lacks the settings permission.")
    )]
    PermissionDenied { message: String },

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(mediactl::no_token),
        help(
            "Configure a token with: mediactl config set-token --token <TOKEN>\n\
             Or set the MEDIACTL_TOKEN environment variable."
        )
    )]
    NoToken { profile: String },

    // ── Settings ─────────────────────────────────────────────────────
    #[error("Unknown setting '{key}'")]
    #[diagnostic(
        code(mediactl::unknown_setting),
        help("Run: mediactl settings show to list the available keys")
    )]
    UnknownSetting { key: String },

    #[error("The configuration could not be saved")]
    #[diagnostic(
        code(mediactl::save_failed),
        help("The server rejected or never received the change-set. Your edits were not applied.")
    )]
    SaveFailed,

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(mediactl::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(mediactl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(mediactl::profile_not_found),
        help(
            "Create one with: mediactl config init --server <URL>\n\
             Or pass the server directly: --server <URL> --token <TOKEN>"
        )
    )]
    ProfileNotFound { name: String },

    #[error("No server configured")]
    #[diagnostic(
        code(mediactl::no_config),
        help(
            "Create a profile with: mediactl config init --server <URL>\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(mediactl::config))]
    Config(Box<figment::Error>),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(mediactl::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(mediactl::json), help("Check the value syntax and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed | Self::NoToken { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::SaveFailed => exit_code::SAVE_FAILED,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::UnknownSetting { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { .. } => CliError::AuthFailed,

            CoreError::PermissionDenied { message } => CliError::PermissionDenied { message },

            CoreError::Timeout => CliError::Timeout,

            CoreError::UnknownSetting { key } => CliError::UnknownSetting { key },

            CoreError::Api { message, .. } => CliError::ApiError { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoToken { profile } => CliError::NoToken { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
            ConfigError::Keyring(e) => CliError::Validation {
                field: "keyring".into(),
                reason: e.to_string(),
            },
        }
    }
}
