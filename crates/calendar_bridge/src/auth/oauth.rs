use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::token_store::{TokenRecord, TokenStore};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};

/// Scope needed to create and read events on the user's calendars
pub const CALENDAR_EVENTS_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

/// OAuth provider configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Google OAuth configuration for Calendar event access
    pub fn google_calendar(config: &BridgeConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: vec![CALENDAR_EVENTS_SCOPE.to_string()],
        }
    }
}

/// Body returned by Google's token endpoint, on success or failure
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenResponse {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
    }

    /// Human readable reason for a response without an access token
    fn failure_reason(&self, status: reqwest::StatusCode) -> String {
        match (&self.error, &self.error_description) {
            (Some(error), Some(desc)) => format!("{} - {}", error, desc),
            (Some(error), None) => error.clone(),
            _ => format!("token endpoint returned {} without access_token", status),
        }
    }
}

/// OAuth client for the authorization code flow and token refresh
pub struct OAuthClient {
    config: OAuthConfig,
    token_store: TokenStore,
    http_client: reqwest::Client,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig, token_store: TokenStore, http_client: reqwest::Client) -> Self {
        Self {
            config,
            token_store,
            http_client,
        }
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    /// Consent screen URL requesting offline access with a forced consent prompt,
    /// so Google issues a refresh token on every authorization
    pub fn authorization_url(&self) -> Result<String> {
        let mut url = url::Url::parse(&self.config.auth_url)
            .map_err(|e| BridgeError::Config(format!("Invalid auth URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");

        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens and store them under `user_id`
    pub async fn exchange_code(&self, code: &str, user_id: &str) -> Result<TokenRecord> {
        debug!("Exchanging authorization code for user {}", user_id);

        let form_params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&form_params)
            .send()
            .await?;

        let status = response.status();
        let token_response = TokenResponse::parse(&response.text().await?);

        let Some(access_token) = token_response.access_token() else {
            let reason = token_response.failure_reason(status);
            warn!("Token exchange failed: {}", reason);
            return Err(BridgeError::TokenExchange(reason));
        };

        if token_response.refresh_token.is_none() {
            warn!("Google did not issue a refresh token for user {}", user_id);
        }

        let record = self.token_store.upsert(
            user_id,
            access_token.to_string(),
            token_response.refresh_token.clone(),
            token_response.expires_at(),
        );

        info!("[OK] Stored OAuth tokens for user {}", user_id);
        Ok(record)
    }

    /// Mint a new access token from the stored refresh token
    pub async fn refresh_token(&self, user_id: &str) -> Result<TokenRecord> {
        let refresh_token = self
            .token_store
            .get(user_id)
            .and_then(|record| record.refresh_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BridgeError::NoRefreshToken(user_id.to_string()))?;

        debug!("Refreshing access token for user {}", user_id);

        let form_params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&form_params)
            .send()
            .await?;

        let status = response.status();
        let token_response = TokenResponse::parse(&response.text().await?);

        let Some(access_token) = token_response.access_token() else {
            let reason = token_response.failure_reason(status);
            warn!("Token refresh failed for user {}: {}", user_id, reason);
            return Err(BridgeError::RefreshFailed(reason));
        };

        let record = match token_response.refresh_token.clone() {
            // Rotated refresh token replaces the stored one
            Some(rotated) => self.token_store.upsert(
                user_id,
                access_token.to_string(),
                Some(rotated),
                token_response.expires_at(),
            ),
            None => self
                .token_store
                .update_access_token(user_id, access_token.to_string(), token_response.expires_at())
                .ok_or_else(|| BridgeError::NoRefreshToken(user_id.to_string()))?,
        };

        info!("[OK] Refreshed access token for user {}", user_id);
        Ok(record)
    }

    /// Refresh and return only the new access token
    pub async fn refresh(&self, user_id: &str) -> Result<String> {
        Ok(self.refresh_token(user_id).await?.access_token)
    }
}
