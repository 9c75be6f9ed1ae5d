// Shared transport configuration for building reqwest::Client instances.
//
// The settings client and the event-stream client share TLS and timeout
// settings through this module, avoiding duplicated builder logic. The
// stream variant must not carry a total request timeout -- it would kill
// the long-lived connection mid-stream.

use std::path::PathBuf;
use std::time::Duration;

/// TLS verification mode.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for self-signed local servers).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` for request/response calls.
    ///
    /// Applies `timeout` as a total per-request deadline.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(user_agent());
        self.finish(builder)
    }

    /// Build a `reqwest::Client` for the persistent event stream.
    ///
    /// `timeout` bounds only connection establishment; once headers arrive
    /// the response body is an unbounded stream.
    pub fn build_stream_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let builder = reqwest::Client::builder()
            .connect_timeout(self.timeout)
            .user_agent(user_agent());
        self.finish(builder)
    }

    fn finish(
        &self,
        mut builder: reqwest::ClientBuilder,
    ) -> Result<reqwest::Client, crate::error::Error> {
        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path).map_err(|e| {
                    crate::error::Error::Tls(format!("failed to read CA cert: {e}"))
                })?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| crate::error::Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

fn user_agent() -> String {
    format!("mediactl/{}", env!("CARGO_PKG_VERSION"))
}
