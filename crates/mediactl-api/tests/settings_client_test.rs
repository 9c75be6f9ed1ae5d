#![allow(clippy::unwrap_used)]
// Integration tests for `SettingsClient` using wiremock.

use std::sync::Arc;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mediactl_api::{Error, SettingsClient, StaticToken};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SettingsClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let token = Arc::new(StaticToken::new("test-token".to_string().into()));
    let client = SettingsClient::with_client(reqwest::Client::new(), base_url, token);
    (server, client)
}

// ── Read tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_settings_success() {
    let (server, client) = setup().await;

    let payload = json!({
        "userSettingsDefaults": {
            "auto_update": true,
            "server_name": "MediaServer"
        },
        "userSettings": {
            "server_name": "Living Room"
        },
        "serverEngines": [
            { "value": "0", "label": "HTTP engine v2" },
            { "value": "1", "label": "HTTP engine v1" }
        ],
        "sortMethods": [
            { "value": "4", "label": "SortByName" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/v1/api/settings"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
        .mount(&server)
        .await;

    let settings = client.get_settings().await.unwrap();

    assert_eq!(settings.user_settings["server_name"], "Living Room");
    assert_eq!(settings.user_settings_defaults["auto_update"], true);
    assert_eq!(settings.server_engines.len(), 2);
    assert_eq!(settings.server_engines[0].label, "HTTP engine v2");
    assert_eq!(settings.sort_methods[0].value, "4");
    // Lists absent from the payload default to empty.
    assert!(settings.network_interfaces.is_empty());
}

#[tokio::test]
async fn test_get_settings_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/api/settings"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.get_settings().await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_get_settings_forbidden() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/api/settings"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = client.get_settings().await;

    assert!(
        matches!(result, Err(Error::Forbidden { .. })),
        "expected Forbidden error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_get_settings_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/api/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    match client.get_settings().await {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── Write tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_save_settings_posts_exact_changes() {
    let (server, client) = setup().await;

    let expected = json!({ "auto_update": false });

    Mock::given(method("POST"))
        .and(path("/v1/api/settings"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut changes = serde_json::Map::new();
    changes.insert("auto_update".into(), json!(false));

    client.save_settings(&changes).await.unwrap();
}

#[tokio::test]
async fn test_save_settings_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/api/settings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut changes = serde_json::Map::new();
    changes.insert("auto_update".into(), json!(false));

    match client.save_settings(&changes).await {
        Err(Error::Api { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected Api error, got: {other:?}"),
    }
}
