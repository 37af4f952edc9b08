use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::AppState;
use crate::calendar::{bearer_token, EventRequest, EventResource};
use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct EventListBody {
    pub eventos: Vec<EventResource>,
}

/// Create an event on the caller's primary calendar
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: std::result::Result<Json<EventRequest>, JsonRejection>,
) -> Result<Json<EventResource>> {
    let Json(event) = body?;
    let access_token = bearer_token(&headers)?;
    let user_id = state.identity.resolve(&headers);

    let created = state
        .calendar
        .create_event(&user_id, access_token, &event)
        .await?;

    Ok(Json(created))
}

/// Upcoming events on the caller's primary calendar
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<EventListBody>> {
    let access_token = bearer_token(&headers)?;
    let user_id = state.identity.resolve(&headers);

    let eventos = state.calendar.list_events(&user_id, access_token).await?;

    Ok(Json(EventListBody { eventos }))
}
