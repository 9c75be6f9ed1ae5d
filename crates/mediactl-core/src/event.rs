// ── Server push events ──
//
// Every frame on the event stream carries a JSON object tagged by an
// `action` field. The serde tag IS the dispatch table: adding a variant
// here is all it takes to route a new action. Unknown actions and
// malformed payloads parse to `None` and are dropped, so old clients
// survive new servers and vice versa.

use serde::Deserialize;

/// Memory usage snapshot pushed by the server, in MiB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MemorySnapshot {
    pub max: u64,
    pub used: u64,
    pub buffer: u64,
    pub dbcache: u64,
}

/// A typed event from the push stream, discriminated by `action`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Periodic memory statistics for the status display.
    UpdateMemory {
        max: u64,
        used: u64,
        #[serde(default)]
        buffer: u64,
        /// Only sent by newer servers.
        #[serde(default)]
        dbcache: u64,
    },

    /// Transient status line text.
    ShowMessage { message: String },

    /// A notification the server wants shown to the user.
    Notify {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        color: Option<String>,
        #[serde(default, rename = "autoClose")]
        auto_close: bool,
    },

    /// A setting was changed by another session; carries the changed
    /// key(s) as a partial settings object.
    SetConfigurationChanged {
        #[serde(default, rename = "userConfiguration")]
        user_configuration: serde_json::Map<String, serde_json::Value>,
    },

    /// Whether the server has pending changes that need a restart.
    SetReloadable { value: bool },
}

impl ServerEvent {
    /// Parse a frame payload. Malformed JSON or an unrecognized `action`
    /// yields `None` -- such frames must never take the client down.
    pub fn parse(data: &str) -> Option<Self> {
        match serde_json::from_str(data) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!(error = %e, "dropping unrecognized stream payload");
                None
            }
        }
    }
}
