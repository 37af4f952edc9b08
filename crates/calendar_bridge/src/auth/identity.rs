use axum::http::HeaderMap;

/// Resolves which stored token record belongs to the caller of a request.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> String;
}

/// Resolves every request to the same user id.
///
/// Stands in for real session handling: all callers share one token record.
#[derive(Debug, Clone)]
pub struct FixedIdentity {
    user_id: String,
}

impl FixedIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl IdentityResolver for FixedIdentity {
    fn resolve(&self, _headers: &HeaderMap) -> String {
        self.user_id.clone()
    }
}
