#![allow(clippy::unwrap_used)]
// Integration tests for `EventSource` using wiremock.
//
// Wiremock serves the whole SSE body and then closes the connection, which
// conveniently exercises both the frame path and the reconnect path.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use secrecy::SecretString;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mediactl_api::sse::stream_url;
use mediactl_api::{EventSource, ReconnectConfig, StaticToken, StreamUpdate, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

fn fast_reconnect() -> ReconnectConfig {
    ReconnectConfig {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        max_retries: Some(1),
    }
}

fn sse_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}

/// Collect updates until `pred` matches one (inclusive) or the timeout hits.
async fn collect_until(
    rx: &mut broadcast::Receiver<StreamUpdate>,
    pred: impl Fn(&StreamUpdate) -> bool,
) -> Vec<StreamUpdate> {
    let mut seen = Vec::new();
    let deadline = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(update) => {
                    let done = pred(&update);
                    seen.push(update);
                    if done {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
    .await;
    assert!(deadline.is_ok(), "timed out waiting for updates: {seen:?}");
    seen
}

async fn connect(
    server: &MockServer,
    token: Arc<dyn mediactl_api::TokenProvider>,
    reconnect: ReconnectConfig,
) -> (EventSource, CancellationToken) {
    let base: Url = server.uri().parse().unwrap();
    let cancel = CancellationToken::new();
    let source = EventSource::connect(
        stream_url(&base).unwrap(),
        token,
        &TransportConfig::default(),
        reconnect,
        cancel.clone(),
    )
    .unwrap();
    (source, cancel)
}

fn static_token() -> Arc<dyn mediactl_api::TokenProvider> {
    Arc::new(StaticToken::new("stream-token".to_string().into()))
}

// ── Lifecycle tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_verified_open_then_events_then_lost() {
    let server = MockServer::start().await;

    let body = "event: message\n\
                data: {\"action\":\"show_message\",\"message\":\"Scan complete\"}\n\n";
    Mock::given(method("GET"))
        .and(path("/v1/api/sse"))
        .respond_with(sse_response(body))
        .mount(&server)
        .await;

    let (source, cancel) = connect(&server, static_token(), fast_reconnect()).await;
    let mut rx = source.into_updates();

    let updates = collect_until(&mut rx, |u| matches!(u, StreamUpdate::Lost { .. })).await;
    cancel.cancel();

    assert!(matches!(updates[0], StreamUpdate::Connecting));
    assert!(matches!(updates[1], StreamUpdate::Open));
    match &updates[2] {
        StreamUpdate::Event(frame) => {
            assert_eq!(frame.event.as_deref(), Some("message"));
            assert!(frame.data.contains("Scan complete"));
        }
        other => panic!("expected Event, got {other:?}"),
    }
    assert!(matches!(updates[3], StreamUpdate::Lost { .. }));
}

#[tokio::test]
async fn test_wrong_content_type_never_reports_open() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/api/sse"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>sorry</html>"))
        .mount(&server)
        .await;

    let (source, cancel) = connect(&server, static_token(), fast_reconnect()).await;
    let mut rx = source.into_updates();

    let updates = collect_until(&mut rx, |u| matches!(u, StreamUpdate::Lost { .. })).await;
    cancel.cancel();

    assert!(
        !updates.iter().any(|u| matches!(u, StreamUpdate::Open)),
        "a non-SSE content type must not count as a verified open: {updates:?}"
    );
}

#[tokio::test]
async fn test_rejected_status_reports_lost() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/api/sse"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (source, cancel) = connect(&server, static_token(), fast_reconnect()).await;
    let mut rx = source.into_updates();

    let updates = collect_until(&mut rx, |u| matches!(u, StreamUpdate::Lost { .. })).await;
    cancel.cancel();

    assert!(matches!(updates[0], StreamUpdate::Connecting));
    match &updates[1] {
        StreamUpdate::Lost { reason } => assert!(reason.contains("Authentication")),
        other => panic!("expected Lost, got {other:?}"),
    }
}

#[tokio::test]
async fn test_foreign_event_names_are_skipped() {
    let server = MockServer::start().await;

    let body = "event: heartbeat\ndata: {}\n\n\
                data: {\"action\":\"set_reloadable\",\"value\":true}\n\n";
    Mock::given(method("GET"))
        .and(path("/v1/api/sse"))
        .respond_with(sse_response(body))
        .mount(&server)
        .await;

    let (source, cancel) = connect(&server, static_token(), fast_reconnect()).await;
    let mut rx = source.into_updates();

    let updates = collect_until(&mut rx, |u| matches!(u, StreamUpdate::Lost { .. })).await;
    cancel.cancel();

    let events: Vec<_> = updates
        .iter()
        .filter_map(|u| match u {
            StreamUpdate::Event(frame) => Some(frame),
            _ => None,
        })
        .collect();
    assert_eq!(events.len(), 1, "only the default-named frame should pass");
    assert!(events[0].data.contains("set_reloadable"));
}

// ── Reconnect tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_reconnect_re_reads_the_token() {
    let server = MockServer::start().await;

    // First attempt fails, forcing a retry with a freshly read token.
    Mock::given(method("GET"))
        .and(path("/v1/api/sse"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/api/sse"))
        .respond_with(sse_response("data: {\"action\":\"show_message\",\"message\":\"hi\"}\n\n"))
        .mount(&server)
        .await;

    let counter = Arc::new(AtomicU32::new(0));
    let rotating = {
        let counter = Arc::clone(&counter);
        move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            SecretString::from(format!("rotating-{n}"))
        }
    };

    let (source, cancel) = connect(&server, Arc::new(rotating), fast_reconnect()).await;
    let mut rx = source.into_updates();

    let updates = collect_until(&mut rx, |u| matches!(u, StreamUpdate::Open)).await;
    cancel.cancel();

    // Connecting, Lost, Connecting, Open -- two attempts.
    assert!(
        updates
            .iter()
            .filter(|u| matches!(u, StreamUpdate::Connecting))
            .count()
            >= 2
    );

    let requests = server.received_requests().await.unwrap();
    let auth_headers: Vec<String> = requests
        .iter()
        .map(|r| {
            r.headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        })
        .collect();
    assert_eq!(auth_headers[0], "Bearer rotating-0");
    assert_eq!(auth_headers[1], "Bearer rotating-1");
}

#[tokio::test]
async fn test_shutdown_stops_the_loop() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/api/sse"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let reconnect = ReconnectConfig {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        max_retries: None,
    };
    let (source, cancel) = connect(&server, static_token(), reconnect).await;
    let mut rx = source.subscribe();

    // Let at least one attempt fail, then shut down.
    let _ = collect_until(&mut rx, |u| matches!(u, StreamUpdate::Lost { .. })).await;
    source.shutdown();
    assert!(cancel.is_cancelled());

    // The channel drains and closes once the task exits; no further
    // Connecting updates should arrive after that.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let mut trailing = 0;
    while let Ok(update) = rx.try_recv() {
        if matches!(update, StreamUpdate::Connecting) {
            trailing += 1;
        }
    }
    assert!(trailing <= 2, "loop kept reconnecting after shutdown");
}
