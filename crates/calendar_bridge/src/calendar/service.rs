use std::future::Future;
use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::{info, warn};

use super::client::{GoogleCalendarClient, MAX_LISTED_EVENTS};
use super::models::{EventRequest, EventResource};
use crate::auth::OAuthClient;
use crate::error::{BridgeError, Result};

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the access token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.trim().is_empty())
        .ok_or(BridgeError::MissingToken)
}

/// Which token an attempt runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// Token presented by the caller, validity unknown
    Presented,
    /// Token minted by the one allowed refresh
    Refreshed,
}

/// Calendar operations on behalf of a user, refreshing the token at most once
#[derive(Clone)]
pub struct CalendarService {
    oauth: Arc<OAuthClient>,
    http_client: reqwest::Client,
    api_base: String,
    default_time_zone: String,
}

impl CalendarService {
    pub fn new(
        oauth: Arc<OAuthClient>,
        http_client: reqwest::Client,
        api_base: impl Into<String>,
        default_time_zone: impl Into<String>,
    ) -> Self {
        Self {
            oauth,
            http_client,
            api_base: api_base.into(),
            default_time_zone: default_time_zone.into(),
        }
    }

    /// Create an event on the user's primary calendar
    pub async fn create_event(
        &self,
        user_id: &str,
        access_token: &str,
        event: &EventRequest,
    ) -> Result<EventResource> {
        let payload = &event.to_calendar_event(&self.default_time_zone);

        let created = self
            .with_token_retry(user_id, access_token, move |client| async move {
                client.insert_event(payload).await
            })
            .await?;

        info!("[OK] Created event '{}' for user {}", payload.summary, user_id);
        Ok(created)
    }

    /// Up to ten upcoming single events ordered by start time
    pub async fn list_events(
        &self,
        user_id: &str,
        access_token: &str,
    ) -> Result<Vec<EventResource>> {
        self.with_token_retry(user_id, access_token, |client| async move {
            client.list_events(MAX_LISTED_EVENTS).await
        })
        .await
    }

    /// Run `call` with the presented token; a retryable failure triggers one
    /// refresh and one more call, any other outcome is final.
    async fn with_token_retry<T, F, Fut>(
        &self,
        user_id: &str,
        access_token: &str,
        call: F,
    ) -> Result<T>
    where
        F: Fn(GoogleCalendarClient) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut token = access_token.to_string();
        let mut attempt = Attempt::Presented;

        loop {
            let client =
                GoogleCalendarClient::new(self.http_client.clone(), self.api_base.as_str(), &token);
            let result = match client {
                Ok(client) => call(client).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if attempt == Attempt::Presented && e.is_retryable() => {
                    warn!("Calendar call rejected for user {} ({}), refreshing token", user_id, e);
                    token = self.oauth.refresh(user_id).await?;
                    attempt = Attempt::Refreshed;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{OAuthConfig, TokenStore};
    use crate::config::BridgeConfig;
    use axum::http::{HeaderValue, StatusCode};

    const USER: &str = "usuario_demo";

    fn service_for(server_url: &str) -> CalendarService {
        let mut config = BridgeConfig::new("client-id", "client-secret");
        config.token_url = format!("{}/token", server_url);
        config.calendar_api_base = server_url.to_string();

        let http = reqwest::Client::new();
        let oauth = OAuthClient::new(OAuthConfig::google_calendar(&config), TokenStore::new(), http.clone());
        oauth
            .token_store()
            .upsert(USER, "ya29.expired".to_string(), Some("1//refresh".to_string()), None);

        CalendarService::new(Arc::new(oauth), http, config.calendar_api_base, config.default_time_zone)
    }

    fn standup() -> EventRequest {
        serde_json::from_value(serde_json::json!({
            "summary": "Standup",
            "description": "Daily sync",
            "start": {"dateTime": "2024-01-10T09:00:00"},
            "end": {"dateTime": "2024-01-10T09:15:00"},
            "time_zone": "America/Santiago"
        }))
        .unwrap()
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Err(BridgeError::MissingToken)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc123"));
        assert!(matches!(bearer_token(&headers), Err(BridgeError::MissingToken)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(bearer_token(&headers), Err(BridgeError::MissingToken)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");
    }

    #[tokio::test]
    async fn test_create_event_with_valid_token() {
        let mut server = mockito::Server::new_async().await;
        let calendar = server
            .mock("POST", "/calendars/primary/events")
            .match_header("authorization", "Bearer abc123")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "summary": "Standup",
                "start": {"timeZone": "America/Santiago"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"evt1","summary":"Standup","status":"confirmed"}"#)
            .create_async()
            .await;
        let token = server.mock("POST", "/token").expect(0).create_async().await;

        let service = service_for(&server.url());
        let created = service.create_event(USER, "abc123", &standup()).await.unwrap();

        calendar.assert_async().await;
        token.assert_async().await;
        assert_eq!(created["summary"], "Standup");
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_once_then_succeeds() {
        let mut server = mockito::Server::new_async().await;
        let rejected = server
            .mock("POST", "/calendars/primary/events")
            .match_header("authorization", "Bearer ya29.expired")
            .with_status(401)
            .with_body(r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#)
            .expect(1)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29.fresh","expires_in":3599}"#)
            .expect(1)
            .create_async()
            .await;
        let accepted = server
            .mock("POST", "/calendars/primary/events")
            .match_header("authorization", "Bearer ya29.fresh")
            .with_status(200)
            .with_body(r#"{"id":"evt1","summary":"Standup"}"#)
            .expect(1)
            .create_async()
            .await;

        let service = service_for(&server.url());
        let created = service.create_event(USER, "ya29.expired", &standup()).await.unwrap();

        rejected.assert_async().await;
        refresh.assert_async().await;
        accepted.assert_async().await;
        assert_eq!(created["id"], "evt1");
    }

    #[tokio::test]
    async fn test_unusable_token_refreshes_once_then_succeeds() {
        let mut server = mockito::Server::new_async().await;
        let refresh = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29.fresh","expires_in":3599}"#)
            .expect(1)
            .create_async()
            .await;
        let calendar = server
            .mock("GET", "/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .match_header("authorization", "Bearer ya29.fresh")
            .with_status(200)
            .with_body(r#"{"items":[]}"#)
            .expect(1)
            .create_async()
            .await;

        let service = service_for(&server.url());
        let events = service.list_events(USER, "bad\ntoken").await.unwrap();

        refresh.assert_async().await;
        calendar.assert_async().await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_retry_failure_is_terminal() {
        let mut server = mockito::Server::new_async().await;
        let calendar = server
            .mock("POST", "/calendars/primary/events")
            .with_status(401)
            .with_body(r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#)
            .expect(2)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token":"ya29.still-bad"}"#)
            .expect(1)
            .create_async()
            .await;

        let service = service_for(&server.url());
        let err = service.create_event(USER, "ya29.expired", &standup()).await.unwrap_err();

        calendar.assert_async().await;
        refresh.assert_async().await;
        match err {
            BridgeError::CalendarApi { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body["error"]["message"], "Invalid Credentials");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_auth_failure_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let _calendar = server
            .mock("POST", "/calendars/primary/events")
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"Bad Request"}}"#)
            .create_async()
            .await;
        let refresh = server.mock("POST", "/token").expect(0).create_async().await;

        let service = service_for(&server.url());
        let err = service.create_event(USER, "abc123", &standup()).await.unwrap_err();

        refresh.assert_async().await;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_user_cannot_refresh() {
        let mut server = mockito::Server::new_async().await;
        let _calendar = server
            .mock("GET", "/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body("{}")
            .create_async()
            .await;

        let service = service_for(&server.url());
        let err = service.list_events("someone_else", "ya29.expired").await.unwrap_err();
        assert!(matches!(err, BridgeError::NoRefreshToken(_)));
    }

    #[tokio::test]
    async fn test_list_events_empty_calendar() {
        let mut server = mockito::Server::new_async().await;
        let _calendar = server
            .mock("GET", "/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"kind":"calendar#events","items":[]}"#)
            .create_async()
            .await;

        let service = service_for(&server.url());
        let events = service.list_events(USER, "abc123").await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_list_events_caps_at_ten() {
        let items: Vec<_> = (0..12)
            .map(|i| serde_json::json!({"id": format!("evt{}", i)}))
            .collect();

        let mut server = mockito::Server::new_async().await;
        let _calendar = server
            .mock("GET", "/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(serde_json::json!({ "items": items }).to_string())
            .create_async()
            .await;

        let service = service_for(&server.url());
        let events = service.list_events(USER, "abc123").await.unwrap();
        assert_eq!(events.len(), MAX_LISTED_EVENTS);
        assert_eq!(events[0]["id"], "evt0");
    }
}
