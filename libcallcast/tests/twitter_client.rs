//! Integration tests for `TwitterClient` using wiremock HTTP mocks.

use libcallcast::config::TwitterConfig;
use libcallcast::credentials::TwitterCredentials;
use libcallcast::error::{CallcastError, PlatformError};
use libcallcast::platforms::twitter::TwitterClient;
use libcallcast::platforms::Platform;
use libcallcast::types::PostRequest;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> TwitterClient {
    let credentials =
        TwitterCredentials::from_lookup(|name| Some(format!("test-{}", name.to_lowercase())))
            .expect("credentials should be complete");
    let config = TwitterConfig {
        api_base: server.uri(),
        upload_base: server.uri(),
        timeout_secs: 5,
    };
    TwitterClient::new(&config, credentials).expect("client construction should not fail")
}

async fn mount_me(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "2244994945", "name": "Callcast", "username": "callcast_bot"}
        })))
        .mount(server)
        .await;
}

fn authorization_of(request: &wiremock::Request) -> String {
    request
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn authenticate_returns_identity_and_signs_request() {
    let server = MockServer::start().await;
    mount_me(&server).await;

    let mut client = test_client(&server);
    let identity = client.authenticate().await.expect("should authenticate");

    assert_eq!(identity.id, "2244994945");
    assert_eq!(identity.username, "callcast_bot");
    assert_eq!(client.identity(), Some(&identity));

    let requests = server.received_requests().await.unwrap();
    let auth = authorization_of(&requests[0]);
    assert!(auth.starts_with("OAuth "));
    assert!(auth.contains("oauth_consumer_key=\"test-twitter_api_key\""));
    assert!(auth.contains("oauth_token=\"test-twitter_access_token\""));
    assert!(auth.contains("oauth_signature_method=\"HMAC-SHA1\""));
    assert!(auth.contains("oauth_signature=\""));
    // Secrets are only used for signing
    assert!(!auth.contains("test-twitter_api_secret"));
    assert!(!auth.contains("test-twitter_access_token_secret"));
}

#[tokio::test]
async fn authenticate_401_is_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "title": "Unauthorized", "type": "about:blank", "status": 401, "detail": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let mut client = test_client(&server);
    let result = client.authenticate().await;

    match result {
        Err(CallcastError::Platform(PlatformError::Authentication(msg))) => {
            assert!(msg.contains("401"));
        }
        other => panic!("Expected Authentication error, got {:?}", other),
    }
    assert!(client.identity().is_none());
}

#[tokio::test]
async fn authenticate_garbled_identity_is_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let result = test_client(&server).authenticate().await;

    assert!(matches!(
        result,
        Err(CallcastError::Platform(PlatformError::Authentication(_)))
    ));
}

#[tokio::test]
async fn authenticate_server_outage_is_not_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let mut client = test_client(&server);
    let result = client.authenticate().await;

    match result {
        Err(CallcastError::Platform(PlatformError::Posting(msg))) => {
            assert!(msg.contains("HTTP 503"));
            assert!(msg.contains("Service Unavailable"));
        }
        other => panic!("Expected Posting error for a 503, got {:?}", other),
    }
    assert!(client.identity().is_none());
}

#[tokio::test]
async fn create_post_sends_text() {
    let server = MockServer::start().await;
    mount_me(&server).await;

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(header_exists("authorization"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({"text": "gm"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "1445880548472328192", "text": "gm"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&server);
    client.authenticate().await.unwrap();

    let id = client
        .create_post(&PostRequest {
            text: "gm".to_string(),
            ..Default::default()
        })
        .await
        .expect("should post");

    assert_eq!(id, "1445880548472328192");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(body, json!({"text": "gm"}));
}

#[tokio::test]
async fn create_reply_with_media() {
    let server = MockServer::start().await;
    mount_me(&server).await;

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_partial_json(json!({
            "reply": {"in_reply_to_tweet_id": "1000"},
            "media": {"media_ids": ["555"]}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "1001", "text": "thread"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&server);
    client.authenticate().await.unwrap();

    let id = client
        .create_post(&PostRequest {
            text: "thread".to_string(),
            reply_to: Some("1000".to_string()),
            media_ids: vec!["555".to_string()],
        })
        .await
        .unwrap();

    assert_eq!(id, "1001");
}

#[tokio::test]
async fn create_post_duplicate_is_posting_error() {
    let server = MockServer::start().await;
    mount_me(&server).await;

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "You are not allowed to create a Tweet with duplicate content.",
            "type": "about:blank",
            "title": "Forbidden",
            "status": 403
        })))
        .mount(&server)
        .await;

    let mut client = test_client(&server);
    client.authenticate().await.unwrap();

    let result = client
        .create_post(&PostRequest {
            text: "same again".to_string(),
            ..Default::default()
        })
        .await;

    match result {
        Err(CallcastError::Platform(PlatformError::Posting(msg))) => {
            assert!(msg.contains("duplicate content"));
        }
        other => panic!("Expected Posting error, got {:?}", other),
    }
}

#[tokio::test]
async fn upload_media_sends_signed_form() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1.1/media/upload.json"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("media_data="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "media_id": 710511363345354753u64,
            "media_id_string": "710511363345354753",
            "size": 11065,
            "image": {"image_type": "image/png", "w": 800, "h": 320}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let image = dir.path().join("msgtwt.png");
    std::fs::write(&image, b"\x89PNG\r\n\x1a\n").unwrap();

    let id = test_client(&server)
        .upload_media(&image)
        .await
        .expect("upload should succeed");

    assert_eq!(id, "710511363345354753");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    // base64 of the PNG signature, percent-encoded
    assert_eq!(body, "media_data=iVBORw0KGgo%3D");
    assert!(authorization_of(&requests[0]).starts_with("OAuth "));
}

#[tokio::test]
async fn upload_media_rejection_is_media_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1.1/media/upload.json"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"code": 324, "message": "Image file size must be <= 5242880 bytes"}]
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let image = dir.path().join("huge.png");
    std::fs::write(&image, b"not really huge").unwrap();

    let result = test_client(&server).upload_media(&image).await;

    match result {
        Err(CallcastError::Platform(PlatformError::Media(msg))) => {
            assert!(msg.contains("5242880"));
        }
        other => panic!("Expected Media error, got {:?}", other),
    }
}

#[tokio::test]
async fn upload_media_missing_file_is_media_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let result = test_client(&server)
        .upload_media(&dir.path().join("absent.png"))
        .await;

    assert!(matches!(
        result,
        Err(CallcastError::Platform(PlatformError::Media(_)))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}
