// Settings endpoint HTTP client
//
// Wraps `reqwest::Client` with media-server URL construction, bearer auth
// injection, and response decoding. The read endpoint returns the user
// settings (possibly partial -- the server omits keys at their defaults)
// plus the selection lists the presentation layer feeds into dropdowns.
// The write endpoint accepts only changed keys, never the full settings map.

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::{self, TokenProvider};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Base path of the web API, shared by all endpoints.
pub(crate) const API_BASE_PATH: &str = "/v1/api";

/// A raw JSON settings map as the server sends it.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// One entry of a dropdown selection list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Payload of the settings read endpoint.
///
/// `user_settings` carries only the keys the user has changed from their
/// defaults; `user_settings_defaults` is the server's own default template.
/// Everything else is reference data for dropdown rendering.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsResponse {
    pub user_settings_defaults: JsonMap,
    pub user_settings: JsonMap,
    pub server_engines: Vec<SelectOption>,
    pub sort_methods: Vec<SelectOption>,
    pub all_renderer_names: Vec<SelectOption>,
    pub enabled_renderer_names: Vec<SelectOption>,
    pub network_interfaces: Vec<SelectOption>,
    pub fully_played_actions: Vec<SelectOption>,
}

/// HTTP client for the settings read/write endpoints.
pub struct SettingsClient {
    http: reqwest::Client,
    base_url: Url,
    token: Arc<dyn TokenProvider>,
}

impl SettingsClient {
    /// Create a new settings client from a `TransportConfig`.
    ///
    /// `base_url` is the server root (e.g. `http://192.168.1.5:9002`).
    pub fn new(
        base_url: Url,
        token: Arc<dyn TokenProvider>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Create a settings client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, token: Arc<dyn TokenProvider>) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/v1/api/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            API_BASE_PATH,
            path
        );
        Ok(Url::parse(&full)?)
    }

    // ── Endpoint calls ───────────────────────────────────────────────

    /// Read the full settings resource.
    pub async fn get_settings(&self) -> Result<SettingsResponse, Error> {
        let url = self.api_url("settings")?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, auth::authorization_value(self.token.as_ref()))
            .send()
            .await
            .map_err(Error::Transport)?;

        self.decode(resp).await
    }

    /// Submit a change-set to the write endpoint.
    ///
    /// The body must contain only the changed keys; the server applies them
    /// on top of its current configuration. Any response body is
    /// informational and is discarded.
    pub async fn save_settings(&self, changes: &JsonMap) -> Result<(), Error> {
        let url = self.api_url("settings")?;
        debug!(keys = changes.len(), "POST {}", url);

        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, auth::authorization_value(self.token.as_ref()))
            .json(changes)
            .send()
            .await
            .map_err(Error::Transport)?;

        check_status(&resp)?;
        Ok(())
    }

    /// Check the status line, then decode the JSON body, keeping the raw
    /// body around for diagnostics when decoding fails.
    async fn decode<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        check_status(&resp)?;

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Map non-2xx statuses to their error variants.
fn check_status(resp: &reqwest::Response) -> Result<(), Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: "bearer token rejected or session expired".into(),
        });
    }
    if status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Forbidden {
            message: "account lacks settings permission".into(),
        });
    }
    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("request rejected")
                .into(),
        });
    }
    Ok(())
}
