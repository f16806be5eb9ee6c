//! HTTP provider client tests.
//!
//! Exercises status classification, payload handling, and the bounded
//! timeout against a wiremock provider.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use common::secret::SecretString;
use common::types::ExternalUserId;
use rc_service::errors::RcError;
use rc_service::models::MeetingFeatures;
use rc_service::services::provider_client::{
    ConferenceProviderGateway, CreateMeetingRequest, HttpProviderClient,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(base_url: &str) -> HttpProviderClient {
    HttpProviderClient::new(
        base_url,
        SecretString::from("k-test"),
        Duration::from_millis(500),
    )
    .expect("client should build")
}

fn meeting_request() -> CreateMeetingRequest {
    CreateMeetingRequest {
        client_request_token: "token-1".to_string(),
        media_region: "us-east-1".to_string(),
        features: MeetingFeatures::default(),
    }
}

#[tokio::test]
async fn test_create_meeting_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/meetings"))
        .and(header("authorization", "Bearer k-test"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "meeting_id": "m-001",
            "media_region": "us-east-1",
            "media_placement": {"audio_host": "audio.example.com:3478"},
        })))
        .mount(&server)
        .await;

    let meeting = client(&server.uri())
        .create_meeting(&meeting_request())
        .await
        .unwrap();

    assert_eq!(meeting.meeting_id, "m-001");
    assert_eq!(
        meeting.descriptor["media_placement"]["audio_host"],
        "audio.example.com:3478"
    );
}

#[tokio::test]
async fn test_create_meeting_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/meetings"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let err = client(&server.uri())
        .create_meeting(&meeting_request())
        .await
        .unwrap_err();

    assert!(matches!(err, RcError::ProviderBadRequest(_)));
    assert!(!err.is_retriable());
}

#[tokio::test]
async fn test_create_meeting_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/meetings"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server.uri())
        .create_meeting(&meeting_request())
        .await
        .unwrap_err();

    assert!(matches!(err, RcError::ProviderUnavailable(_)));
    assert!(err.is_retriable());
}

#[tokio::test]
async fn test_create_meeting_timeout_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/meetings"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"meeting_id": "m-001"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = client(&server.uri())
        .create_meeting(&meeting_request())
        .await
        .unwrap_err();

    assert!(matches!(err, RcError::ProviderUnavailable(_)));
}

#[tokio::test]
async fn test_create_meeting_connection_refused_is_unavailable() {
    // Nothing listens on the discard port.
    let err = client("http://127.0.0.1:9")
        .create_meeting(&meeting_request())
        .await
        .unwrap_err();

    assert!(matches!(err, RcError::ProviderUnavailable(_)));
}

#[tokio::test]
async fn test_create_meeting_rejects_payload_without_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/meetings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let err = client(&server.uri())
        .create_meeting(&meeting_request())
        .await
        .unwrap_err();

    assert!(matches!(err, RcError::Serialization(_)));
}

#[tokio::test]
async fn test_create_attendee_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/meetings/m-001/attendees"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "attendee_id": "a-001",
            "join_token": "jt-1",
        })))
        .mount(&server)
        .await;

    let attendee = client(&server.uri())
        .create_attendee("m-001", &ExternalUserId::new())
        .await
        .unwrap();

    assert_eq!(attendee.attendee_id, "a-001");
    assert_eq!(attendee.descriptor["join_token"], "jt-1");
}

/// 404 on attendee creation is the stale-record signal.
#[tokio::test]
async fn test_create_attendee_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/meetings/m-stale/attendees"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server.uri())
        .create_attendee("m-stale", &ExternalUserId::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RcError::ProviderMeetingNotFound(_)));
}

#[tokio::test]
async fn test_delete_meeting_success() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/meetings/m-001"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client(&server.uri()).delete_meeting("m-001").await.unwrap();
}

/// Deleting an already-deleted meeting surfaces the not-found signal;
/// the coordinator treats it as success.
#[tokio::test]
async fn test_delete_meeting_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/meetings/m-gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server.uri())
        .delete_meeting("m-gone")
        .await
        .unwrap_err();

    assert!(matches!(err, RcError::ProviderMeetingNotFound(_)));
}

/// Trailing slashes in the configured base URL do not double up.
#[tokio::test]
async fn test_base_url_trailing_slash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/meetings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"meeting_id": "m-001"})))
        .mount(&server)
        .await;

    let meeting = client(&format!("{}/", server.uri()))
        .create_meeting(&meeting_request())
        .await
        .unwrap();

    assert_eq!(meeting.meeting_id, "m-001");
}
