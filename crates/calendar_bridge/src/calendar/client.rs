//! Google Calendar API client.
//!
//! Thin wrapper over the `primary` calendar's events collection. Building a
//! client validates the bearer credential; API failures come back as
//! [`BridgeError::CalendarApi`] with Google's status and body.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use tracing::debug;

use super::models::{CalendarEvent, EventListResponse, EventResource};
use crate::error::{BridgeError, Result};

/// Calendar the bridge reads from and writes to
pub const PRIMARY_CALENDAR: &str = "primary";

/// Upper bound on events returned by a list call
pub const MAX_LISTED_EVENTS: usize = 10;

#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    api_base: String,
    authorization: HeaderValue,
}

impl GoogleCalendarClient {
    /// Creates a client authorized with `access_token`.
    ///
    /// Fails with [`BridgeError::InvalidCredentials`] when the token cannot be
    /// carried in an `Authorization` header.
    pub fn new(
        http_client: reqwest::Client,
        api_base: impl Into<String>,
        access_token: &str,
    ) -> Result<Self> {
        if access_token.trim().is_empty() {
            return Err(BridgeError::InvalidCredentials("empty access token".to_string()));
        }

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|e| BridgeError::InvalidCredentials(e.to_string()))?;
        authorization.set_sensitive(true);

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            authorization,
        })
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.api_base, PRIMARY_CALENDAR)
    }

    /// Inserts an event into the primary calendar
    pub async fn insert_event(&self, event: &CalendarEvent) -> Result<EventResource> {
        let response = self
            .http_client
            .post(self.events_url())
            .header(AUTHORIZATION, self.authorization.clone())
            .json(event)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(api_error(status, body));
        }

        debug!("Created calendar event: {}", event.summary);
        parse_body(status, body)
    }

    /// Lists upcoming single events ordered by start time
    pub async fn list_events(&self, max_results: usize) -> Result<Vec<EventResource>> {
        let response = self
            .http_client
            .get(self.events_url())
            .header(AUTHORIZATION, self.authorization.clone())
            .query(&[
                ("maxResults", max_results.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, body));
        }

        let list: EventListResponse = serde_json::from_value(parse_body(status, body)?)
            .map_err(|e| BridgeError::CalendarApi {
                status: StatusCode::BAD_GATEWAY,
                body: serde_json::Value::String(format!("unexpected events list shape: {}", e)),
            })?;

        let mut items = list.items;
        items.truncate(max_results);

        debug!("Fetched {} events from calendar {}", items.len(), PRIMARY_CALENDAR);
        Ok(items)
    }
}

fn api_error(status: StatusCode, body: String) -> BridgeError {
    let body = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
    BridgeError::CalendarApi { status, body }
}

fn parse_body(status: StatusCode, body: String) -> Result<serde_json::Value> {
    serde_json::from_str(&body).map_err(|e| BridgeError::CalendarApi {
        status: StatusCode::BAD_GATEWAY,
        body: serde_json::Value::String(format!(
            "invalid JSON from Calendar API ({}): {}",
            status, e
        )),
    })
}
