// mediactl-api: Async client for the media server web API (settings + event stream)

pub mod auth;
pub mod error;
pub mod settings;
pub mod sse;
pub mod transport;

pub use auth::{StaticToken, TokenProvider};
pub use error::Error;
pub use settings::{SelectOption, SettingsClient, SettingsResponse};
pub use sse::{EventSource, ReconnectConfig, StreamUpdate};
pub use transport::{TlsMode, TransportConfig};
