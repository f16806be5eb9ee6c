//! Conferencing provider gateway.
//!
//! Thin, mockable abstraction over the external provider's meeting API.
//! The HTTP implementation applies a bounded per-request timeout and
//! classifies responses into the [`RcError`] taxonomy; it never retries
//! and never inspects provider error bodies beyond the status class.
//!
//! # Classification
//!
//! - 2xx: success
//! - 404: [`RcError::ProviderMeetingNotFound`]
//! - other 4xx: [`RcError::ProviderBadRequest`]
//! - 5xx, timeouts, connection errors: [`RcError::ProviderUnavailable`]

use crate::errors::RcError;
use crate::models::{MeetingFeatures, ProviderAttendee, ProviderMeeting};
use crate::observability::metrics;
use async_trait::async_trait;
use common::secret::{ExposeSecret, SecretString};
use common::types::ExternalUserId;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Request body for provider meeting creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMeetingRequest {
    /// Idempotency token for the provider; fresh per creation attempt.
    pub client_request_token: String,

    /// Media region the meeting is hosted in.
    pub media_region: String,

    /// Feature toggles.
    pub features: MeetingFeatures,
}

/// Gateway to the external conferencing provider.
///
/// Implementations perform the remote call and nothing else: no local
/// persistence, no retries.
#[async_trait]
pub trait ConferenceProviderGateway: Send + Sync {
    /// Create a provider meeting.
    async fn create_meeting(
        &self,
        request: &CreateMeetingRequest,
    ) -> Result<ProviderMeeting, RcError>;

    /// Admit a new attendee into an existing provider meeting.
    ///
    /// Fails with [`RcError::ProviderMeetingNotFound`] when the meeting id
    /// is stale or unknown, the caller's signal that a stored meeting
    /// record is invalid and must be dropped.
    async fn create_attendee(
        &self,
        meeting_id: &str,
        external_user_id: &ExternalUserId,
    ) -> Result<ProviderAttendee, RcError>;

    /// Delete a provider meeting.
    ///
    /// Deleting an already-deleted meeting surfaces
    /// [`RcError::ProviderMeetingNotFound`]; callers tearing a room down
    /// treat that as success.
    async fn delete_meeting(&self, meeting_id: &str) -> Result<(), RcError>;
}

/// Request body for provider attendee creation.
#[derive(Debug, Serialize)]
struct CreateAttendeeBody {
    external_user_id: String,
}

/// HTTP client for the conferencing provider API.
pub struct HttpProviderClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpProviderClient {
    /// Create a new provider client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Provider API base URL
    /// * `api_key` - Provider API key, sent as a bearer token
    /// * `timeout` - Bounded per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `RcError::Config` if the underlying HTTP client cannot be
    /// built.
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, RcError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RcError::Config(format!("Failed to build provider HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Classify a transport-level failure.
    fn classify_transport(operation: &str, err: &reqwest::Error) -> RcError {
        if err.is_timeout() {
            RcError::ProviderUnavailable(format!("{operation} timed out"))
        } else {
            RcError::ProviderUnavailable(format!("{operation} failed: {err}"))
        }
    }

    /// Classify a non-success status.
    fn classify_status(operation: &str, status: reqwest::StatusCode) -> RcError {
        if status == reqwest::StatusCode::NOT_FOUND {
            RcError::ProviderMeetingNotFound(format!("{operation} returned 404"))
        } else if status.is_client_error() {
            RcError::ProviderBadRequest(format!("{operation} returned {status}"))
        } else {
            RcError::ProviderUnavailable(format!("{operation} returned {status}"))
        }
    }

    /// Send a request and return the parsed success payload.
    async fn dispatch(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, RcError> {
        let start = Instant::now();

        let result = request
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                metrics::record_provider_request(operation, "error", start.elapsed());
                return Err(Self::classify_transport(operation, &e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            metrics::record_provider_request(operation, "error", start.elapsed());
            return Err(Self::classify_status(operation, status));
        }

        let payload = response.json::<Value>().await.map_err(|e| {
            metrics::record_provider_request(operation, "error", start.elapsed());
            RcError::Serialization(format!("{operation} returned unparseable payload: {e}"))
        })?;

        metrics::record_provider_request(operation, "success", start.elapsed());
        Ok(payload)
    }
}

#[async_trait]
impl ConferenceProviderGateway for HttpProviderClient {
    #[instrument(skip_all, name = "rc.provider.create_meeting", fields(media_region = %request.media_region))]
    async fn create_meeting(
        &self,
        request: &CreateMeetingRequest,
    ) -> Result<ProviderMeeting, RcError> {
        let url = format!("{}/v1/meetings", self.base_url);
        let payload = self
            .dispatch("create_meeting", self.http.post(&url).json(request))
            .await?;

        let meeting = ProviderMeeting::from_descriptor(payload)?;

        debug!(
            target: "rc.services.provider",
            meeting_id = %meeting.meeting_id,
            "Provider meeting created"
        );

        Ok(meeting)
    }

    #[instrument(skip_all, name = "rc.provider.create_attendee", fields(meeting_id = %meeting_id))]
    async fn create_attendee(
        &self,
        meeting_id: &str,
        external_user_id: &ExternalUserId,
    ) -> Result<ProviderAttendee, RcError> {
        let url = format!("{}/v1/meetings/{meeting_id}/attendees", self.base_url);
        let body = CreateAttendeeBody {
            external_user_id: external_user_id.to_string(),
        };
        let payload = self
            .dispatch("create_attendee", self.http.post(&url).json(&body))
            .await?;

        let attendee = ProviderAttendee::from_descriptor(payload)?;

        debug!(
            target: "rc.services.provider",
            meeting_id = %meeting_id,
            attendee_id = %attendee.attendee_id,
            "Provider attendee created"
        );

        Ok(attendee)
    }

    #[instrument(skip_all, name = "rc.provider.delete_meeting", fields(meeting_id = %meeting_id))]
    async fn delete_meeting(&self, meeting_id: &str) -> Result<(), RcError> {
        let url = format!("{}/v1/meetings/{meeting_id}", self.base_url);
        let start = Instant::now();

        let result = self
            .http
            .delete(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                metrics::record_provider_request("delete_meeting", "error", start.elapsed());
                return Err(Self::classify_transport("delete_meeting", &e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            metrics::record_provider_request("delete_meeting", "error", start.elapsed());
            return Err(Self::classify_status("delete_meeting", status));
        }

        metrics::record_provider_request("delete_meeting", "success", start.elapsed());

        debug!(
            target: "rc.services.provider",
            meeting_id = %meeting_id,
            "Provider meeting deleted"
        );

        Ok(())
    }
}
