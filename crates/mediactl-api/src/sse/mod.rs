//! Server-sent event stream with auto-reconnect.
//!
//! Holds one long-lived HTTP connection to the server's push endpoint and
//! broadcasts lifecycle updates and parsed frames through a
//! [`tokio::sync::broadcast`] channel. Handles reconnection with
//! exponential backoff + jitter automatically; consumers own what happens
//! on each transition (state display, outage notification) -- this module
//! only reports them.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mediactl_api::{EventSource, ReconnectConfig, StaticToken, TransportConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let url = mediactl_api::sse::stream_url(&"http://192.168.1.5:9002".parse()?)?;
//! let token = Arc::new(StaticToken::new("secret".to_string().into()));
//!
//! let source = EventSource::connect(
//!     url, token, &TransportConfig::default(), ReconnectConfig::default(), cancel.clone(),
//! )?;
//! let mut rx = source.subscribe();
//!
//! while let Ok(update) = rx.recv().await {
//!     println!("{update:?}");
//! }
//!
//! source.shutdown();
//! ```

mod parser;

pub use parser::{EventFrame, FrameParser};

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::auth::{self, TokenProvider};
use crate::error::Error;
use crate::settings::API_BASE_PATH;
use crate::transport::TransportConfig;

// ── Constants ────────────────────────────────────────────────────────

const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// The MIME type a verified event stream response must declare.
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Build the push endpoint URL from the server base URL.
pub fn stream_url(base: &Url) -> Result<Url, Error> {
    let full = format!("{}{}/sse", base.as_str().trim_end_matches('/'), API_BASE_PATH);
    Ok(Url::parse(&full)?)
}

// ── StreamUpdate ─────────────────────────────────────────────────────

/// A lifecycle or data update from the event stream transport.
#[derive(Debug, Clone)]
pub enum StreamUpdate {
    /// A (re)connection attempt has started.
    Connecting,
    /// The connection opened and verified: 2xx status and an
    /// `text/event-stream` content type.
    Open,
    /// A parsed event frame arrived.
    Event(EventFrame),
    /// The connection failed or dropped; the transport will retry unless
    /// the retry budget is exhausted or the stream is shut down.
    Lost { reason: String },
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for stream reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── EventSource ──────────────────────────────────────────────────────

/// Handle to a running event stream.
///
/// Drop all receivers and call [`shutdown`](Self::shutdown) to tear down
/// the background task. After shutdown no further updates are delivered --
/// a continuation from a stale connection is a no-op.
pub struct EventSource {
    update_rx: broadcast::Receiver<StreamUpdate>,
    cancel: CancellationToken,
}

impl EventSource {
    /// Spawn the connection loop against the given push endpoint.
    ///
    /// Returns immediately; the first connection attempt happens
    /// asynchronously. The token provider is consulted again on every
    /// attempt, so a rotated credential is honored on reconnect.
    pub fn connect(
        url: Url,
        token: Arc<dyn TokenProvider>,
        transport: &TransportConfig,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        let http = transport.build_stream_client()?;
        let (update_tx, update_rx) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            stream_loop(http, url, token, update_tx, reconnect, task_cancel).await;
        });

        Ok(Self { update_rx, cancel })
    }

    /// Get a new broadcast receiver for stream updates.
    ///
    /// Multiple consumers can subscribe concurrently. A consumer that
    /// falls behind receives [`broadcast::error::RecvError::Lagged`].
    /// A receiver created here only sees updates sent after the call;
    /// use [`into_updates`](Self::into_updates) for the primary consumer.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamUpdate> {
        self.update_rx.resubscribe()
    }

    /// Consume the handle, returning the original receiver.
    ///
    /// It has been buffering since `connect`, so the primary consumer sees
    /// every update including the first `Connecting`. Shut the stream down
    /// afterwards through the cancellation token passed to `connect`.
    pub fn into_updates(self) -> broadcast::Receiver<StreamUpdate> {
        self.update_rx
    }

    /// Signal the background task to shut down gracefully.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → on error, backoff → reconnect.
async fn stream_loop(
    http: reqwest::Client,
    url: Url,
    token: Arc<dyn TokenProvider>,
    update_tx: broadcast::Sender<StreamUpdate>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = connect_and_read(&http, &url, token.as_ref(), &update_tx, &cancel) => {
                match result {
                    // Clean end of stream (server closed it). Reset the
                    // attempt counter and reconnect immediately.
                    Ok(()) => {
                        if cancel.is_cancelled() {
                            break;
                        }
                        tracing::info!("event stream ended cleanly, reconnecting");
                        let _ = update_tx.send(StreamUpdate::Lost {
                            reason: "stream ended".into(),
                        });
                        attempt = 0;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, attempt, "event stream error");
                        let _ = update_tx.send(StreamUpdate::Lost {
                            reason: e.to_string(),
                        });

                        if let Some(max) = reconnect.max_retries {
                            if attempt >= max {
                                tracing::error!(
                                    max_retries = max,
                                    "event stream reconnection limit reached, giving up"
                                );
                                break;
                            }
                        }

                        let delay = calculate_backoff(attempt, &reconnect);
                        tracing::info!(
                            delay_ms = delay.as_millis() as u64,
                            attempt,
                            "waiting before reconnect"
                        );

                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(delay) => {}
                        }

                        attempt += 1;
                    }
                }
            }
        }
    }

    tracing::debug!("event stream loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one connection, verify it, and read frames until it drops.
///
/// The `Open` update is only emitted once the response carries both a
/// success status and the event-stream content type; a success status with
/// the wrong content type is read without ever being reported as open.
async fn connect_and_read(
    http: &reqwest::Client,
    url: &Url,
    token: &dyn TokenProvider,
    update_tx: &broadcast::Sender<StreamUpdate>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    let _ = update_tx.send(StreamUpdate::Connecting);
    tracing::info!(url = %url, "connecting to event stream");

    let resp = http
        .get(url.clone())
        .header(ACCEPT, EVENT_STREAM_CONTENT_TYPE)
        .header(AUTHORIZATION, auth::authorization_value(token))
        .send()
        .await
        .map_err(Error::Transport)?;

    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: "bearer token rejected on stream connect".into(),
        });
    }
    if !status.is_success() {
        return Err(Error::StreamConnect(format!(
            "stream request rejected with HTTP {status}"
        )));
    }

    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with(EVENT_STREAM_CONTENT_TYPE) {
        tracing::info!("event stream connected");
        let _ = update_tx.send(StreamUpdate::Open);
    } else {
        // Open but unverified: keep reading without reporting Connected.
        tracing::warn!(content_type, "event stream opened with unexpected content type");
    }

    let mut body = resp.bytes_stream();
    let mut parser = FrameParser::new();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            chunk = body.next() => {
                match chunk {
                    Some(Ok(bytes)) => {
                        for frame in parser.push(&bytes) {
                            if is_message_frame(&frame) {
                                let _ = update_tx.send(StreamUpdate::Event(frame));
                            } else {
                                tracing::trace!(event = ?frame.event, "skipping non-message frame");
                            }
                        }
                    }
                    Some(Err(e)) => return Err(Error::Transport(e)),
                    None => return Ok(()),
                }
            }
        }
    }
}

/// The server multiplexes everything over the default `message` event name;
/// anything else is foreign and skipped.
fn is_message_frame(frame: &EventFrame) -> bool {
    frame.event.as_deref().is_none_or(|name| name == "message")
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`
///
/// Jitter is +-25% to spread out reconnection storms from multiple clients.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(attempt as i32);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic "jitter" seeded from the attempt number.
    // Not cryptographically random, but good enough for backoff spread.
    let jitter_factor = 1.0 + 0.25 * ((attempt as f64 * 7.3).sin());
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────
