//! Calendar Bridge Service
//!
//! Lets a frontend authorize against Google and work with the user's primary
//! Google Calendar through a small REST API.
//!
//! # Features
//! - Google OAuth authorization code flow with offline access
//! - In-memory token storage with refresh on rejected calls
//! - Event creation and listing on the primary calendar
//! - HTTP server with REST API endpoints

pub mod auth;
pub mod calendar;
pub mod config;
pub mod error;
pub mod server;

pub use auth::{
    FixedIdentity, IdentityResolver, OAuthClient, OAuthConfig, TokenRecord, TokenStore,
};
pub use calendar::{CalendarService, EventRequest, EventResource, GoogleCalendarClient};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use server::{build_router, start_server, AppState};
