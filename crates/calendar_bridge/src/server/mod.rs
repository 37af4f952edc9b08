//! Calendar Bridge HTTP Server
//!
//! Routes the frontend's OAuth and calendar requests to the broker and the
//! calendar façade.

pub mod calendar_handlers;
pub mod oauth_handlers;

use crate::auth::{FixedIdentity, IdentityResolver, OAuthClient, OAuthConfig, TokenStore};
use crate::calendar::CalendarService;
use crate::config::BridgeConfig;
use axum::{
    routing::{get, post},
    Router as AxumRouter,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub oauth: Arc<OAuthClient>,
    pub calendar: CalendarService,
    /// Maps a request to the user whose tokens it acts on
    pub identity: Arc<dyn IdentityResolver>,
    pub frontend_url: String,
}

impl AppState {
    /// Wire the broker, façade and identity resolver from configuration
    pub fn from_config(config: &BridgeConfig) -> Self {
        let http_client = reqwest::Client::new();
        let oauth = Arc::new(OAuthClient::new(
            OAuthConfig::google_calendar(config),
            TokenStore::new(),
            http_client.clone(),
        ));

        let calendar = CalendarService::new(
            oauth.clone(),
            http_client,
            config.calendar_api_base.clone(),
            config.default_time_zone.clone(),
        );

        Self {
            oauth,
            calendar,
            identity: Arc::new(FixedIdentity::new(config.demo_user_id.clone())),
            frontend_url: config.frontend_url.clone(),
        }
    }

    pub fn token_store(&self) -> &TokenStore {
        self.oauth.token_store()
    }
}

/// Build the router:
/// - GET /auth/google - Redirect to Google's consent screen
/// - GET /auth/callback - Exchange the code and redirect to the frontend
/// - GET /auth/tokens - List stored tokens (no secrets)
/// - POST /auth/tokens/refresh - Refresh the caller's token
/// - POST /crear-evento - Create a calendar event
/// - GET /eventos - List upcoming events
pub fn build_router(state: Arc<AppState>) -> AxumRouter {
    AxumRouter::new()
        .route("/auth/google", get(oauth_handlers::auth_google))
        .route("/auth/callback", get(oauth_handlers::auth_callback))
        .route("/auth/tokens", get(oauth_handlers::list_tokens))
        .route("/auth/tokens/refresh", post(oauth_handlers::refresh_token))
        .route("/crear-evento", post(calendar_handlers::create_event))
        .route("/eventos", get(calendar_handlers::list_events))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::very_permissive()),
        )
        .with_state(state)
}

/// Start the Calendar Bridge HTTP server
///
/// # Errors
/// Returns error if binding the listener or serving fails
pub async fn start_server(config: BridgeConfig, host: &str, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config));
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    info!("[INFO] Calendar Bridge listening on {}", addr);
    info!("[INFO] Available endpoints:");
    info!("  GET    /auth/google             - Start Google authorization");
    info!("  GET    /auth/callback           - OAuth callback handler");
    info!("  GET    /auth/tokens             - List stored tokens");
    info!("  POST   /auth/tokens/refresh     - Refresh the current user's token");
    info!("  POST   /crear-evento            - Create a calendar event");
    info!("  GET    /eventos                 - List upcoming events");

    axum::serve(listener, app).await?;

    Ok(())
}
