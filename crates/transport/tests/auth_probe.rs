//! Authentication probe and response handling against a mock speech API

use std::time::Duration;

use agri_voice_config::{AuthScheme, SpeechApiConfig};
use agri_voice_transport::{ApiClient, TransportError};
use serde::Deserialize;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_config(server: &MockServer, schemes: Vec<AuthScheme>) -> SpeechApiConfig {
    SpeechApiConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        auth_schemes: schemes,
        probe_on_startup: true,
        probe_timeout_secs: 5,
    }
}

#[derive(Debug, Deserialize)]
struct Translated {
    translated_text: String,
}

#[tokio::test]
async fn test_probe_settles_on_first_accepted_scheme() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(header_exists("api-subscription-key"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"translated_text": "ठीक"})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::connect(&api_config(
        &server,
        vec![AuthScheme::SubscriptionKey, AuthScheme::Bearer, AuthScheme::ApiKey],
    ))
    .await
    .unwrap();

    assert_eq!(client.scheme(), AuthScheme::Bearer);

    // Subsequent requests reuse the settled scheme
    let reply: Translated = client
        .post_json(
            "/translate",
            &serde_json::json!({"input": "ok"}),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert_eq!(reply.translated_text, "ठीक");
}

#[tokio::test]
async fn test_non_auth_error_still_settles_scheme() {
    let server = MockServer::start().await;

    // A validation error proves the key was accepted
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad input"))
        .mount(&server)
        .await;

    let client = ApiClient::connect(&api_config(&server, vec![AuthScheme::ApiKey]))
        .await
        .unwrap();
    assert_eq!(client.scheme(), AuthScheme::ApiKey);
}

#[tokio::test]
async fn test_all_schemes_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(401))
        .expect(3)
        .mount(&server)
        .await;

    let err = ApiClient::connect(&api_config(
        &server,
        vec![AuthScheme::SubscriptionKey, AuthScheme::Bearer, AuthScheme::ApiKey],
    ))
    .await
    .unwrap_err();

    match err {
        TransportError::Auth(tried) => {
            assert!(tried.contains("subscription_key"));
            assert!(tried.contains("api_key"));
        }
        other => panic!("expected auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_probe_skipped_when_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = api_config(&server, vec![AuthScheme::Bearer, AuthScheme::ApiKey]);
    config.probe_on_startup = false;

    let client = ApiClient::connect(&config).await.unwrap();
    assert_eq!(client.scheme(), AuthScheme::Bearer);
}

#[tokio::test]
async fn test_non_json_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), "test-key", AuthScheme::SubscriptionKey).unwrap();
    let result: Result<Translated, _> = client
        .post_json("/translate", &serde_json::json!({}), Duration::from_secs(5))
        .await;

    assert!(matches!(result, Err(TransportError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_server_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), "test-key", AuthScheme::SubscriptionKey).unwrap();
    let result: Result<Translated, _> = client
        .post_json("/translate", &serde_json::json!({}), Duration::from_secs(5))
        .await;

    match result {
        Err(TransportError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream overloaded");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_configuration_error() {
    let config = SpeechApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: Some("k".to_string()),
        auth_schemes: vec![AuthScheme::Bearer],
        probe_on_startup: true,
        probe_timeout_secs: 2,
    };
    assert!(matches!(
        ApiClient::connect(&config).await,
        Err(TransportError::Configuration(_))
    ));
}
