//! Client for the workplace booking API.

use reqwest::Client;

use super::model::{BookingRequest, BookingResponse, SpacesResponse, Workspace};
use crate::domain::error::{BookingError, Result};
use crate::domain::scope::Scope;
use crate::infrastructure::config::ApiConfig;

/// Authenticated JSON client. The bearer token is taken from the browser session, so it is
/// passed per call rather than stored.
#[derive(Debug, Clone)]
pub struct WorkplaceClient {
    client: Client,
    base_url: String,
}

impl WorkplaceClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BookingError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up the catalog entry of a location, returning its first shared workspace.
    pub async fn fetch_space(
        &self,
        scope: &Scope,
        token: &str,
        location_uuid: &str,
    ) -> Result<Workspace> {
        let url = format!("{}/spaces/get-spaces", self.base_url);

        let response = scope
            .run(async {
                Ok(self
                    .client
                    .get(&url)
                    .query(&[("locationUUIDs", location_uuid)])
                    .bearer_auth(token)
                    .send()
                    .await?)
            })
            .await?;

        if !response.status().is_success() {
            return Err(BookingError::Api(format!(
                "error fetching locations: {}",
                response.status()
            )));
        }

        let body: SpacesResponse = scope.run(async { Ok(response.json().await?) }).await?;

        body.get_shared_workspaces
            .workspaces
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::LocationNotFound(location_uuid.to_string()))
    }

    /// Post a booking and require the site to confirm it.
    pub async fn create_booking(
        &self,
        scope: &Scope,
        token: &str,
        request: &BookingRequest,
    ) -> Result<BookingResponse> {
        let url = format!("{}/common-booking/", self.base_url);

        let response = scope
            .run(async {
                Ok(self
                    .client
                    .post(&url)
                    .bearer_auth(token)
                    .json(request)
                    .send()
                    .await?)
            })
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BookingError::SubmissionFailure {
                step: "booking request",
                reason: format!("status {}: {}", status, body),
            });
        }

        let booking: BookingResponse = scope.run(async { Ok(response.json().await?) }).await?;

        if !booking.is_success() {
            return Err(BookingError::SubmissionFailure {
                step: "booking request",
                reason: format!(
                    "booking not confirmed ({}): {}",
                    booking.booking_status,
                    booking.errors.join("; ")
                ),
            });
        }

        tracing::info!(reservation = %booking.reservation_id, "Booking confirmed by API");
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::api::model::Workspace;
    use crate::domain::model::TargetDate;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WorkplaceClient {
        WorkplaceClient::new(&ApiConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_space_sends_bearer_and_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spaces/get-spaces"))
            .and(query_param("locationUUIDs", "loc-1"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "getSharedWorkspaces": { "workspaces": [{ "uuid": "space-1" }, { "uuid": "space-2" }] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let space = client_for(&server)
            .fetch_space(&Scope::root(), "tok", "loc-1")
            .await
            .unwrap();
        assert_eq!(space.uuid, "space-1");
    }

    #[tokio::test]
    async fn test_fetch_space_empty_result_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spaces/get-spaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "getSharedWorkspaces": { "workspaces": [] }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_space(&Scope::root(), "tok", "loc-1")
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::LocationNotFound(id) if id == "loc-1"));
    }

    #[tokio::test]
    async fn test_fetch_space_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_space(&Scope::root(), "expired", "loc-1")
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Api(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_create_booking_requires_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/common-booking/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "BookingStatus": "BookingFailed",
                "Errors": ["Insufficient credits"]
            })))
            .mount(&server)
            .await;

        let request = BookingRequest::day_pass(
            &Workspace::default(),
            &TargetDate::from_ymd(2025, 1, 20).unwrap(),
        );
        let err = client_for(&server)
            .create_booking(&Scope::root(), "tok", &request)
            .await
            .unwrap_err();
        match err {
            BookingError::SubmissionFailure { reason, .. } => {
                assert!(reason.contains("Insufficient credits"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_booking_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/common-booking/"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "BookingStatus": "BookingSuccess",
                "ReservationID": "res-42"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = BookingRequest::day_pass(
            &Workspace::default(),
            &TargetDate::from_ymd(2025, 1, 20).unwrap(),
        );
        let booking = client_for(&server)
            .create_booking(&Scope::root(), "tok", &request)
            .await
            .unwrap();
        assert_eq!(booking.reservation_id, "res-42");
    }
}
