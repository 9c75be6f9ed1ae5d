#![allow(clippy::unwrap_used)]
// End-to-end tests for `EventStreamClient` against a wiremock SSE endpoint.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mediactl_core::notify::RecordingNotifier;
use mediactl_core::{
    ConnectionState, EventStreamClient, MemorySnapshot, ReconnectConfig, ServerConfig, Severity,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn server_config(server: &MockServer) -> ServerConfig {
    let mut config = ServerConfig::new(
        server.uri().parse().unwrap(),
        "stream-token".to_string().into(),
    );
    config.reconnect = ReconnectConfig {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        max_retries: Some(2),
    };
    config
}

fn sse_body(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}

/// Wait until the watched value satisfies `pred`, or panic after 5s.
async fn wait_for<T>(rx: &mut tokio::sync::watch::Receiver<T>, pred: impl Fn(&T) -> bool) {
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if pred(&rx.borrow()) {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
    .await;
    assert!(result.is_ok(), "timed out waiting for watched value");
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn connects_and_applies_memory_updates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/api/sse"))
        .respond_with(sse_body(
            "data: {\"action\":\"update_memory\",\"max\":2048,\"used\":640,\"buffer\":12}\n\n",
        ))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::new();
    let client = EventStreamClient::new(notifier);
    client.connect(&server_config(&server)).await.unwrap();

    let mut memory = client.memory();
    wait_for(&mut memory, |m| m.used == 640).await;
    assert_eq!(
        *memory.borrow(),
        MemorySnapshot {
            max: 2048,
            used: 640,
            buffer: 12,
            dbcache: 0,
        }
    );

    client.disconnect().await;
    assert_eq!(
        *client.connection_state().borrow(),
        ConnectionState::Disconnected
    );
}

#[tokio::test]
async fn one_outage_notice_across_repeated_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/api/sse"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::new();
    let client = EventStreamClient::new(notifier.clone());
    client.connect(&server_config(&server)).await.unwrap();

    let mut state = client.connection_state();
    wait_for(&mut state, |s| *s == ConnectionState::Error).await;

    // Let the retry budget (2 retries) burn through more failures.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let outage_notices: Vec<_> = notifier
        .notices()
        .into_iter()
        .filter(|n| n.severity == Severity::Warning)
        .collect();
    assert_eq!(outage_notices.len(), 1, "flaky retries must not spam");

    client.disconnect().await;
}

#[tokio::test]
async fn second_connect_while_live_is_a_no_op() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/api/sse"))
        .respond_with(sse_body(": keepalive\n\n"))
        .mount(&server)
        .await;

    let client = EventStreamClient::new(RecordingNotifier::new());
    let config = server_config(&server);
    client.connect(&config).await.unwrap();
    // Must not start a second transport loop.
    client.connect(&config).await.unwrap();

    client.disconnect().await;
}

#[tokio::test]
async fn disconnect_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/api/sse"))
        .respond_with(sse_body(": keepalive\n\n"))
        .mount(&server)
        .await;

    let client = EventStreamClient::new(RecordingNotifier::new());
    let config = server_config(&server);
    client.connect(&config).await.unwrap();
    client.disconnect().await;

    assert!(client.connect(&config).await.is_err());
    assert_eq!(
        *client.connection_state().borrow(),
        ConnectionState::Disconnected
    );
}
