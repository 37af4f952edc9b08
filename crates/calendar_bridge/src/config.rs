//! Bridge configuration
//!
//! The OAuth client credentials are required; every URL has a default so a
//! local deployment works out of the box and tests can point the bridge at a
//! mock server.

use crate::error::{BridgeError, Result};

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/auth/callback";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:8100";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_TIME_ZONE: &str = "America/Santiago";
pub const DEFAULT_USER_ID: &str = "usuario_demo";

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub frontend_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub calendar_api_base: String,
    pub default_time_zone: String,
    pub demo_user_id: String,
}

impl BridgeConfig {
    /// Configuration with the given credentials and default endpoints
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            calendar_api_base: DEFAULT_CALENDAR_API_BASE.to_string(),
            default_time_zone: DEFAULT_TIME_ZONE.to_string(),
            demo_user_id: DEFAULT_USER_ID.to_string(),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first when present.
    ///
    /// Requires `CLIENT_ID` and `CLIENT_SECRET`. Optional overrides:
    /// `REDIRECT_URI`, `FRONTEND_URL`, `GOOGLE_AUTH_URL`, `GOOGLE_TOKEN_URL`,
    /// `GOOGLE_CALENDAR_API_BASE`, `DEFAULT_TIME_ZONE`, `DEMO_USER_ID`.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| BridgeError::Config(format!("{} environment variable not set", key)))
        };

        let mut config = Self::new(required("CLIENT_ID")?, required("CLIENT_SECRET")?);

        let overrides: [(&str, &mut String); 7] = [
            ("REDIRECT_URI", &mut config.redirect_uri),
            ("FRONTEND_URL", &mut config.frontend_url),
            ("GOOGLE_AUTH_URL", &mut config.auth_url),
            ("GOOGLE_TOKEN_URL", &mut config.token_url),
            ("GOOGLE_CALENDAR_API_BASE", &mut config.calendar_api_base),
            ("DEFAULT_TIME_ZONE", &mut config.default_time_zone),
            ("DEMO_USER_ID", &mut config.demo_user_id),
        ];
        for (key, slot) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }

        for (key, value) in [
            ("REDIRECT_URI", &config.redirect_uri),
            ("FRONTEND_URL", &config.frontend_url),
            ("GOOGLE_AUTH_URL", &config.auth_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| BridgeError::Config(format!("Invalid {}: {}", key, e)))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            ("CLIENT_ID", "id.apps.googleusercontent.com"),
            ("CLIENT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.client_id, "id.apps.googleusercontent.com");
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.default_time_zone, "America/Santiago");
        assert_eq!(config.demo_user_id, "usuario_demo");
    }

    #[test]
    fn test_overrides() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "secret"),
            ("FRONTEND_URL", "https://app.example.com"),
            ("DEFAULT_TIME_ZONE", "Europe/Madrid"),
        ]))
        .unwrap();

        assert_eq!(config.frontend_url, "https://app.example.com");
        assert_eq!(config.default_time_zone, "Europe/Madrid");
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
    }

    #[test]
    fn test_missing_secret() {
        let err = BridgeConfig::from_lookup(lookup_from(&[("CLIENT_ID", "id")])).unwrap_err();
        assert!(matches!(err, BridgeError::Config(msg) if msg.contains("CLIENT_SECRET")));
    }

    #[test]
    fn test_invalid_frontend_url() {
        let err = BridgeConfig::from_lookup(lookup_from(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "secret"),
            ("FRONTEND_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }
}
