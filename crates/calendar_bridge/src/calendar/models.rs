use serde::{Deserialize, Serialize};

/// Event resource as returned by Google, passed through untouched
pub type EventResource = serde_json::Value;

/// Start or end of an event as sent by the frontend
#[derive(Debug, Clone, Deserialize)]
pub struct EventTimeInput {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone", default)]
    pub time_zone: Option<String>,
}

/// Body of `POST /crear-evento`
#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    pub summary: String,
    pub description: String,
    pub start: EventTimeInput,
    pub end: EventTimeInput,
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl EventRequest {
    /// Build the Calendar API payload.
    ///
    /// Each endpoint keeps its own `timeZone` when given; otherwise the
    /// request's `time_zone` applies, then `default_time_zone`.
    pub fn to_calendar_event(&self, default_time_zone: &str) -> CalendarEvent {
        let fallback = self
            .time_zone
            .as_deref()
            .filter(|tz| !tz.is_empty())
            .unwrap_or(default_time_zone);

        let resolve = |input: &EventTimeInput| EventDateTime {
            date_time: input.date_time.clone(),
            time_zone: input
                .time_zone
                .as_deref()
                .filter(|tz| !tz.is_empty())
                .unwrap_or(fallback)
                .to_string(),
        };

        CalendarEvent {
            summary: self.summary.clone(),
            description: self.description.clone(),
            start: resolve(&self.start),
            end: resolve(&self.end),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

/// Event body posted to the Calendar API
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

/// Response of the events list endpoint; only the items are surfaced
#[derive(Debug, Default, Deserialize)]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<EventResource>,
}
