// ── Event stream state machine ──
//
// Reflects the lifecycle of the push connection and fans typed events out
// to the host through watch/broadcast channels. The transport (connection,
// retry timing, frame parsing) lives in mediactl-api; what this component
// owns is the observable state and the outage-notification gate: one
// notice per continuous outage, however many times the transport cycles
// error → retry → error underneath.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use mediactl_api::sse::stream_url;
use mediactl_api::{EventSource, StreamUpdate, TokenProvider};

use crate::config::ServerConfig;
use crate::error::CoreError;
use crate::event::{MemorySnapshot, ServerEvent};
use crate::model::SettingsMap;
use crate::notify::{Notice, Notifier, Severity};
use crate::settings::from_json_map;

const CONFIG_UPDATE_CHANNEL_SIZE: usize = 64;

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state observable by consumers. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

// ── EventStreamClient ────────────────────────────────────────────────

/// Client-side view of the server push stream.
///
/// Construct once per mounted host, `connect` to start, `disconnect` to
/// tear down. One exclusive connection per instance: a second `connect`
/// while the first is live is a no-op.
pub struct EventStreamClient {
    channels: Arc<StreamChannels>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// The fan-out side, shared with the pump task.
struct StreamChannels {
    state: watch::Sender<ConnectionState>,
    memory: watch::Sender<MemorySnapshot>,
    message: watch::Sender<Option<String>>,
    reloadable: watch::Sender<bool>,
    last_event_at: watch::Sender<Option<DateTime<Utc>>>,
    config_updates: broadcast::Sender<SettingsMap>,
    notifier: Arc<dyn Notifier>,
}

impl EventStreamClient {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (memory, _) = watch::channel(MemorySnapshot::default());
        let (message, _) = watch::channel(None);
        let (reloadable, _) = watch::channel(false);
        let (last_event_at, _) = watch::channel(None);
        let (config_updates, _) = broadcast::channel(CONFIG_UPDATE_CHANNEL_SIZE);

        Self {
            channels: Arc::new(StreamChannels {
                state,
                memory,
                message,
                reloadable,
                last_event_at,
                config_updates,
                notifier,
            }),
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open the push connection and start dispatching.
    ///
    /// The state moves to `Connecting` immediately; `Connected` follows
    /// once the transport verifies the open (status + content type).
    pub async fn connect(&self, config: &ServerConfig) -> Result<(), CoreError> {
        self.connect_with(config, config.token_provider()).await
    }

    /// Like [`connect`](Self::connect), with a custom token provider for
    /// hosts that rotate credentials between reconnect attempts.
    pub async fn connect_with(
        &self,
        config: &ServerConfig,
        token: Arc<dyn TokenProvider>,
    ) -> Result<(), CoreError> {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            warn!("event stream already connected, ignoring connect");
            return Ok(());
        }
        if self.cancel.is_cancelled() {
            return Err(CoreError::Internal(
                "event stream client was disconnected and cannot be reused".into(),
            ));
        }

        self.channels.state.send_replace(ConnectionState::Connecting);

        let source = EventSource::connect(
            stream_url(&config.url)?,
            token,
            &config.transport(),
            config.reconnect.clone(),
            self.cancel.clone(),
        )?;

        let rx = source.into_updates();
        let dispatcher = Dispatcher::new(Arc::clone(&self.channels));
        let cancel = self.cancel.clone();
        *task = Some(tokio::spawn(pump_task(rx, dispatcher, cancel)));
        Ok(())
    }

    /// Tear down the connection. No further reconnection is attempted and
    /// no callback from the stale connection is processed.
    pub async fn disconnect(&self) {
        self.cancel.cancel();
        if let Some(task) = self.task.lock().await.take() {
            let _ = task.await;
        }
        self.channels.state.send_replace(ConnectionState::Disconnected);
        debug!("event stream disconnected");
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.channels.state.subscribe()
    }

    /// Subscribe to the memory usage snapshot.
    pub fn memory(&self) -> watch::Receiver<MemorySnapshot> {
        self.channels.memory.subscribe()
    }

    /// Subscribe to the transient status message.
    pub fn message(&self) -> watch::Receiver<Option<String>> {
        self.channels.message.subscribe()
    }

    /// Subscribe to the restart-needed flag.
    pub fn reloadable(&self) -> watch::Receiver<bool> {
        self.channels.reloadable.subscribe()
    }

    /// When the last event arrived, if any.
    pub fn last_event_at(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.channels.last_event_at.subscribe()
    }

    /// Subscribe to partial configurations pushed when another session
    /// changes a setting. The host decides whether to feed them into a
    /// [`ConfigReconciler`](crate::reconciler::ConfigReconciler).
    pub fn config_updates(&self) -> broadcast::Receiver<SettingsMap> {
        self.channels.config_updates.subscribe()
    }
}

// ── Pump task ────────────────────────────────────────────────────────

async fn pump_task(
    mut rx: broadcast::Receiver<StreamUpdate>,
    mut dispatcher: Dispatcher,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            update = rx.recv() => match update {
                Ok(update) => dispatcher.handle(update),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream consumer lagged, snapshots resync on next event");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
    debug!("event stream pump exiting");
}

// ── Dispatcher ───────────────────────────────────────────────────────

/// Maps transport updates onto observable state and notices.
///
/// Plain struct on purpose: the whole state machine, including the outage
/// gate, is testable by feeding updates -- no connection required.
struct Dispatcher {
    channels: Arc<StreamChannels>,
    outage_notified: bool,
}

impl Dispatcher {
    fn new(channels: Arc<StreamChannels>) -> Self {
        Self {
            channels,
            outage_notified: false,
        }
    }

    fn handle(&mut self, update: StreamUpdate) {
        match update {
            StreamUpdate::Connecting => {
                self.channels.state.send_replace(ConnectionState::Connecting);
            }
            StreamUpdate::Open => {
                self.channels.state.send_replace(ConnectionState::Connected);
                // A verified open ends the outage; the next loss may
                // notify again.
                self.outage_notified = false;
            }
            StreamUpdate::Event(frame) => self.dispatch(&frame.data),
            StreamUpdate::Lost { reason } => {
                self.channels.state.send_replace(ConnectionState::Error);
                if !self.outage_notified {
                    self.outage_notified = true;
                    self.channels.notifier.notify(
                        Notice::warning(
                            "Warning",
                            "Connectivity to the server has been lost.",
                        )
                        .sticky(),
                    );
                    debug!(reason, "outage notice raised");
                }
            }
        }
    }

    /// Route one frame payload by its `action` discriminator.
    fn dispatch(&self, data: &str) {
        let Some(event) = ServerEvent::parse(data) else {
            return;
        };
        self.channels.last_event_at.send_replace(Some(Utc::now()));

        match event {
            ServerEvent::UpdateMemory {
                max,
                used,
                buffer,
                dbcache,
            } => {
                self.channels.memory.send_replace(MemorySnapshot {
                    max,
                    used,
                    buffer,
                    dbcache,
                });
            }
            ServerEvent::ShowMessage { message } => {
                self.channels.message.send_replace(Some(message));
            }
            ServerEvent::Notify {
                title,
                message,
                color,
                auto_close,
                ..
            } => {
                let mut notice = Notice::new(
                    severity_from_color(color.as_deref()),
                    title.unwrap_or_else(|| "Server".into()),
                    message.unwrap_or_default(),
                );
                notice.auto_close = auto_close;
                self.channels.notifier.notify(notice);
            }
            ServerEvent::SetConfigurationChanged { user_configuration } => {
                let _ = self
                    .channels
                    .config_updates
                    .send(from_json_map(&user_configuration));
            }
            ServerEvent::SetReloadable { value } => {
                self.channels.reloadable.send_replace(value);
            }
        }
    }
}

/// The server expresses severity as a display color.
fn severity_from_color(color: Option<&str>) -> Severity {
    match color {
        Some("red") => Severity::Error,
        Some("orange" | "yellow") => Severity::Warning,
        Some("green") => Severity::Success,
        _ => Severity::Info,
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use mediactl_api::sse::EventFrame;

    fn dispatcher() -> (Dispatcher, Arc<RecordingNotifier>, EventStreamClient) {
        let notifier = RecordingNotifier::new();
        let client = EventStreamClient::new(notifier.clone());
        let dispatcher = Dispatcher::new(Arc::clone(&client.channels));
        (dispatcher, notifier, client)
    }

    fn event(data: &str) -> StreamUpdate {
        StreamUpdate::Event(EventFrame {
            event: Some("message".into()),
            data: data.to_string(),
            id: None,
        })
    }

    fn lost() -> StreamUpdate {
        StreamUpdate::Lost {
            reason: "connection reset".into(),
        }
    }

    #[test]
    fn repeated_losses_notify_once() {
        let (mut dispatcher, notifier, client) = dispatcher();

        dispatcher.handle(StreamUpdate::Connecting);
        dispatcher.handle(lost());
        dispatcher.handle(StreamUpdate::Connecting);
        dispatcher.handle(lost());
        dispatcher.handle(lost());

        assert_eq!(notifier.notices().len(), 1, "one notice per outage");
        assert_eq!(*client.connection_state().borrow(), ConnectionState::Error);
    }

    #[test]
    fn each_independent_outage_notifies_again() {
        let (mut dispatcher, notifier, _client) = dispatcher();

        dispatcher.handle(lost());
        dispatcher.handle(StreamUpdate::Open);
        dispatcher.handle(lost());

        assert_eq!(notifier.notices().len(), 2, "one notice per outage");
    }

    #[test]
    fn open_sets_connected_and_clears_the_gate() {
        let (mut dispatcher, _notifier, client) = dispatcher();

        dispatcher.handle(StreamUpdate::Connecting);
        assert_eq!(
            *client.connection_state().borrow(),
            ConnectionState::Connecting
        );

        dispatcher.handle(StreamUpdate::Open);
        assert_eq!(
            *client.connection_state().borrow(),
            ConnectionState::Connected
        );
        assert!(!dispatcher.outage_notified);
    }

    #[test]
    fn update_memory_refreshes_the_snapshot() {
        let (mut dispatcher, _notifier, client) = dispatcher();

        dispatcher.handle(event(
            r#"{"action":"update_memory","max":2048,"used":512,"buffer":16}"#,
        ));

        assert_eq!(
            *client.memory().borrow(),
            MemorySnapshot {
                max: 2048,
                used: 512,
                buffer: 16,
                dbcache: 0,
            }
        );
    }

    #[test]
    fn show_message_updates_the_status_line() {
        let (mut dispatcher, _notifier, client) = dispatcher();

        dispatcher.handle(event(r#"{"action":"show_message","message":"Scanning library"}"#));

        assert_eq!(
            client.message().borrow().as_deref(),
            Some("Scanning library")
        );
    }

    #[test]
    fn unknown_action_changes_nothing_and_does_not_panic() {
        let (mut dispatcher, notifier, client) = dispatcher();

        dispatcher.handle(event(r#"{"action":"update_accounts"}"#));
        dispatcher.handle(event("not json at all"));

        assert_eq!(*client.memory().borrow(), MemorySnapshot::default());
        assert!(client.message().borrow().is_none());
        assert!(notifier.notices().is_empty());
        assert!(client.last_event_at().borrow().is_none());
    }

    #[test]
    fn notify_event_forwards_to_the_notifier() {
        let (mut dispatcher, notifier, _client) = dispatcher();

        dispatcher.handle(event(
            r#"{"action":"notify","title":"Media Library","message":"Scan finished","color":"green","autoClose":true}"#,
        ));

        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Media Library");
        assert_eq!(notices[0].severity, Severity::Success);
        assert!(notices[0].auto_close);
    }

    #[test]
    fn pushed_configuration_reaches_subscribers() {
        let (mut dispatcher, _notifier, client) = dispatcher();
        let mut rx = client.config_updates();

        dispatcher.handle(event(
            r#"{"action":"set_configuration_changed","userConfiguration":{"server_name":"Den"}}"#,
        ));

        let update = rx.try_recv().expect("update should be queued");
        assert_eq!(
            update["server_name"],
            crate::model::SettingValue::Text("Den".into())
        );
    }

    #[test]
    fn reloadable_flag_toggles() {
        let (mut dispatcher, _notifier, client) = dispatcher();

        dispatcher.handle(event(r#"{"action":"set_reloadable","value":true}"#));
        assert!(*client.reloadable().borrow());

        dispatcher.handle(event(r#"{"action":"set_reloadable","value":false}"#));
        assert!(!*client.reloadable().borrow());
    }
}
