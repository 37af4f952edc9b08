use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Authorization code not found: {0}")]
    MissingCode(String),

    #[error("Failed to obtain access token: {0}")]
    TokenExchange(String),

    #[error("No refresh token found for user: {0}")]
    NoRefreshToken(String),

    #[error("Failed to refresh access token: {0}")]
    RefreshFailed(String),

    #[error("Access token required")]
    MissingToken,

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Google Calendar API error ({status})")]
    CalendarApi {
        status: StatusCode,
        body: serde_json::Value,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Whether a single token refresh followed by one retry may recover from this failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            BridgeError::InvalidCredentials(_) => true,
            BridgeError::CalendarApi { status, .. } => *status == StatusCode::UNAUTHORIZED,
            _ => false,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            BridgeError::MissingCode(_)
            | BridgeError::TokenExchange(_)
            | BridgeError::NoRefreshToken(_)
            | BridgeError::RefreshFailed(_)
            | BridgeError::MissingToken
            | BridgeError::InvalidCredentials(_) => StatusCode::BAD_REQUEST,
            BridgeError::InvalidBody(rejection) => rejection.status(),
            BridgeError::CalendarApi { status, .. } => *status,
            BridgeError::Http(_) => StatusCode::BAD_GATEWAY,
            BridgeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match self {
            // Google's error body goes back to the caller untouched
            BridgeError::CalendarApi { body, .. } => body,
            other => serde_json::Value::String(other.to_string()),
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
