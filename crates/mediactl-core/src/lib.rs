// mediactl-core: Settings reconciliation and live-event state between
// mediactl-api and consumers (CLI or any other host).

pub mod config;
pub mod defaults;
pub mod error;
pub mod event;
pub mod model;
pub mod notify;
pub mod reconciler;
pub mod settings;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ServerConfig, TlsVerification};
pub use error::CoreError;
pub use event::{MemorySnapshot, ServerEvent};
pub use model::{ChangeSet, SelectionLists, SettingValue, SettingsMap};
pub use notify::{LogNotifier, Notice, Notifier, Severity};
pub use reconciler::{ConfigReconciler, SaveOutcome};
pub use settings::{apply_change_set, compute_change_set, merge_settings};
pub use stream::{ConnectionState, EventStreamClient};

// Transport types hosts need when wiring things up.
pub use mediactl_api::{ReconnectConfig, SelectOption, SettingsClient};
