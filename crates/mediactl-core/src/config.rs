// ── Runtime connection configuration ──
//
// These types describe *how* to reach the media server. They carry the
// credential and connection tuning, but never touch disk -- the host (CLI
// or otherwise) constructs a `ServerConfig` and hands it in.

use std::sync::Arc;

use secrecy::SecretString;
use url::Url;

use mediactl_api::{ReconnectConfig, SettingsClient, StaticToken, TlsMode, TokenProvider, TransportConfig};

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed local servers).
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single media server.
///
/// Built by the host, passed to the core components -- core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server root URL (e.g. `http://192.168.1.5:9002`).
    pub url: Url,
    /// Bearer token for the web API.
    pub token: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout (total for settings calls, connect-only for the
    /// event stream).
    pub timeout: std::time::Duration,
    /// Event stream reconnection policy.
    pub reconnect: ReconnectConfig,
}

impl ServerConfig {
    pub fn new(url: Url, token: SecretString) -> Self {
        Self {
            url,
            token,
            tls: TlsVerification::default(),
            timeout: std::time::Duration::from_secs(30),
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Build the transport settings shared by both API surfaces.
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }

    /// Build the credential provider handed to the transport.
    pub(crate) fn token_provider(&self) -> Arc<dyn TokenProvider> {
        Arc::new(StaticToken::new(self.token.clone()))
    }
}

/// Construct a [`SettingsClient`] for this server.
pub fn settings_client(config: &ServerConfig) -> Result<SettingsClient, CoreError> {
    SettingsClient::new(
        config.url.clone(),
        config.token_provider(),
        &config.transport(),
    )
    .map_err(CoreError::from)
}
