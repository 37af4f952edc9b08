//! OAuth Authentication Handlers
//!
//! Consent redirect, authorization code callback and token administration.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::AppState;
use crate::error::{BridgeError, Result};

/// Path segment, under the frontend URL, that receives the access token after authorization
const FRONTEND_HOME_SEGMENT: &str = "home";

/// OAuth callback query parameters
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Token information for listing
#[derive(Debug, Serialize)]
pub struct TokenInfo {
    pub user_id: String,
    pub has_refresh_token: bool,
    pub expires_at: Option<String>,
}

/// Response after a manual refresh
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
    pub expires_at: Option<String>,
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Redirect the user to Google's consent screen
pub async fn auth_google(State(state): State<Arc<AppState>>) -> Result<Response> {
    let url = state.oauth.authorization_url()?;
    Ok(found(&url))
}

/// Exchange the authorization code and hand the access token to the frontend
pub async fn auth_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<OAuthCallbackQuery>,
) -> Result<Response> {
    if let Some(error) = params.error {
        let desc = params.error_description.unwrap_or_else(|| "Unknown error".to_string());
        return Err(BridgeError::MissingCode(format!("{}: {}", error, desc)));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| BridgeError::MissingCode("no code query parameter".to_string()))?;

    let user_id = state.identity.resolve(&headers);
    let record = state.oauth.exchange_code(&code, &user_id).await?;

    let mut target = url::Url::parse(&state.frontend_url)
        .map_err(|e| BridgeError::Config(format!("Invalid frontend URL: {}", e)))?;
    target
        .path_segments_mut()
        .map_err(|_| BridgeError::Config(format!("Invalid frontend URL: {}", state.frontend_url)))?
        .pop_if_empty()
        .push(FRONTEND_HOME_SEGMENT);
    target
        .query_pairs_mut()
        .append_pair("access_token", &record.access_token);

    info!("[OK] Authorization complete for user {}, redirecting to frontend", user_id);
    Ok(found(target.as_str()))
}

/// List stored tokens without exposing them
pub async fn list_tokens(State(state): State<Arc<AppState>>) -> Json<Vec<TokenInfo>> {
    let infos = state
        .token_store()
        .all()
        .into_iter()
        .map(|record| TokenInfo {
            has_refresh_token: record.has_refresh_token(),
            expires_at: record.expires_at.map(|t| t.to_rfc3339()),
            user_id: record.user_id,
        })
        .collect();

    Json(infos)
}

/// Refresh the calling user's access token on demand
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>> {
    let user_id = state.identity.resolve(&headers);
    let record = state.oauth.refresh_token(&user_id).await?;

    Ok(Json(RefreshResponse {
        success: true,
        message: "Token refreshed successfully".to_string(),
        user_id,
        expires_at: record.expires_at.map(|t| t.to_rfc3339()),
    }))
}
