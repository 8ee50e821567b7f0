//! Integration tests for the Interact bot client.
//!
//! These tests verify that:
//! - The token request uses basic auth and the client-credentials grant
//! - Bot calls carry the bearer token, application id and JSON body
//! - Tokens with an expiry are reused, tokens without one are not
//! - HTTP failures surface as errors

use gmpa_core::BotClient;
use gmpa_providers::{InteractClient, InteractCredentials};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOT_PATH: &str = "/api/chat-ai/v1/bots/bot-1/messages";

fn client(server: &MockServer) -> InteractClient {
    InteractClient::new(
        server.uri(),
        InteractCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            application_id: "test".to_string(),
        },
    )
}

async fn mount_token(server: &MockServer, body: serde_json::Value, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        // base64("id:secret")
        .and(header("authorization", "Basic aWQ6c2VjcmV0"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_send_message_round_trip() {
    let server = MockServer::start().await;
    mount_token(&server, json!({"access_token": "tok-1"}), 1).await;

    Mock::given(method("POST"))
        .and(path(BOT_PATH))
        .and(header("authorization", "Bearer tok-1"))
        .and(header("x-application-id", "test"))
        .and(body_json(json!({"files": [], "message": "Category\tQuestion\tAnswer\n"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "All good", "id": 7})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server)
        .send_message("bot-1", "Category\tQuestion\tAnswer\n")
        .await
        .unwrap();

    assert_eq!(reply.message(), Some("All good"));
    assert_eq!(reply.raw["id"], 7);
}

#[tokio::test]
async fn test_token_with_expiry_is_reused() {
    let server = MockServer::start().await;
    mount_token(
        &server,
        json!({"access_token": "tok-2", "expires_in": 3600}),
        1,
    )
    .await;

    Mock::given(method("POST"))
        .and(path(BOT_PATH))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    client.send_message("bot-1", "a").await.unwrap();
    client.send_message("bot-1", "b").await.unwrap();
}

#[tokio::test]
async fn test_token_without_expiry_is_fetched_per_call() {
    let server = MockServer::start().await;
    mount_token(&server, json!({"access_token": "tok-3"}), 2).await;

    Mock::given(method("POST"))
        .and(path(BOT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    client.send_message("bot-1", "a").await.unwrap();
    client.send_message("bot-1", "b").await.unwrap();
}

#[tokio::test]
async fn test_unrepresentable_expiry_is_not_cached() {
    let server = MockServer::start().await;
    mount_token(
        &server,
        json!({"access_token": "tok-max", "expires_in": u64::MAX}),
        2,
    )
    .await;

    let client = client(&server);
    assert_eq!(client.access_token().await.unwrap(), "tok-max");
    assert_eq!(client.access_token().await.unwrap(), "tok-max");
}

#[tokio::test]
async fn test_reply_without_message_is_kept_raw() {
    let server = MockServer::start().await;
    mount_token(&server, json!({"access_token": "tok-4"}), 1).await;

    Mock::given(method("POST"))
        .and(path(BOT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
        .mount(&server)
        .await;

    let reply = client(&server).send_message("bot-1", "a").await.unwrap();
    assert_eq!(reply.message(), None);
    assert_eq!(reply.raw, json!({"status": "queued"}));
}

#[tokio::test]
async fn test_rejected_credentials_fail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server).send_message("bot-1", "a").await.unwrap_err();
    assert!(err.to_string().contains("Error obtaining token"));
}

#[tokio::test]
async fn test_missing_access_token_fails() {
    let server = MockServer::start().await;
    mount_token(&server, json!({"token_type": "bearer"}), 1).await;

    let err = client(&server).access_token().await.unwrap_err();
    assert!(err.to_string().contains("missing access_token"));
}

#[tokio::test]
async fn test_bot_error_status_fails() {
    let server = MockServer::start().await;
    mount_token(&server, json!({"access_token": "tok-5"}), 1).await;

    Mock::given(method("POST"))
        .and(path(BOT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).send_message("bot-1", "a").await.unwrap_err();
    assert!(err.to_string().contains("API call failed"));
}
