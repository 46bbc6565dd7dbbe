//! Integration tests for the Gemini backend using a mock HTTP server.
//! These tests don't require an API key and can run without external
//! dependencies.
//!
//! Run with: cargo test -p insightflow-gemini --test gemini_mock_server_tests

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use insightflow::error::ErrorKind;
use insightflow::generation::TextGenerator;
use insightflow_gemini::GeminiGenerator;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a generator pointed at the mock server.
fn create_mock_client(mock_server_uri: &str) -> GeminiGenerator {
    GeminiGenerator::new()
        .with_api_key("test-key")
        .with_model("gemini-2.0-flash")
        .with_api_base(mock_server_uri)
}

/// Standard generateContent response wrapping the given reply text.
fn mock_generate_content_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {
                "parts": [{ "text": text }],
                "role": "model"
            },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_generate_returns_reply_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "Revenue by region" }] }]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mock_generate_content_response("North: 100\nSouth: 200")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let generator = create_mock_client(&mock_server.uri());
    let reply = generator.generate("Revenue by region").await.unwrap();
    assert_eq!(reply, "North: 100\nSouth: 200");
}

#[tokio::test]
async fn test_generate_uses_configured_model() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-pro:generateContent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_generate_content_response("ok")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let generator = create_mock_client(&mock_server.uri()).with_model("gemini-2.0-pro");
    assert_eq!(generator.generate("anything").await.unwrap(), "ok");
}

#[tokio::test]
async fn test_server_error_maps_to_external_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;

    let generator = create_mock_client(&mock_server.uri());
    let err = generator.generate("anything").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalService);
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_rate_limit_error_surfaces_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Resource has been exhausted" }
        })))
        .mount(&mock_server)
        .await;

    let generator = create_mock_client(&mock_server.uri());
    let err = generator.generate("anything").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalService);
    assert!(err.to_string().contains("Resource has been exhausted"));
}

#[tokio::test]
async fn test_malformed_body_maps_to_external_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let generator = create_mock_client(&mock_server.uri());
    let err = generator.generate("anything").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalService);
}

#[tokio::test]
async fn test_empty_candidates_maps_to_external_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&mock_server)
        .await;

    let generator = create_mock_client(&mock_server.uri());
    let err = generator.generate("anything").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalService);
    assert!(err.to_string().contains("no candidates"));
}

#[tokio::test]
async fn test_slow_server_maps_to_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mock_generate_content_response("late"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let generator =
        create_mock_client(&mock_server.uri()).with_timeout(Duration::from_millis(100));
    let err = generator.generate("anything").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_missing_api_key_fails_without_request() {
    let mock_server = MockServer::start().await;

    // No mock mounted: a request reaching the server would 404, but the
    // generator must fail before sending anything.
    let generator = GeminiGenerator::default()
        .with_api_base(mock_server.uri())
        .with_timeout(Duration::from_millis(100));

    // Only meaningful when the environment doesn't provide a key.
    if std::env::var("GEMINI_API_KEY").is_err() {
        let err = generator.generate("anything").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
