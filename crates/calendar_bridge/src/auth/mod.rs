//! Google OAuth broker: consent URL, code exchange, refresh and token storage

pub mod identity;
pub mod oauth;
pub mod token_store;

pub use identity::{FixedIdentity, IdentityResolver};
pub use oauth::{OAuthClient, OAuthConfig, CALENDAR_EVENTS_SCOPE};
pub use token_store::{TokenRecord, TokenStore};
