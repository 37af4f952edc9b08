use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

/// OAuth tokens held for one user
#[derive(Debug, Clone, Serialize)]
pub struct TokenRecord {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Process-lifetime token storage keyed by user id.
///
/// Clones share the same map. Updates to a single user go through the map's
/// entry API so concurrent refreshes cannot interleave a read and a write.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: Arc<DashMap<String, TokenRecord>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> Option<TokenRecord> {
        self.tokens.get(user_id).map(|entry| entry.value().clone())
    }

    /// Insert or update the tokens for `user_id`.
    ///
    /// The access token is always replaced. An existing refresh token is kept
    /// unless a new one is supplied.
    pub fn upsert(
        &self,
        user_id: &str,
        access_token: String,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> TokenRecord {
        let refresh_token = refresh_token.filter(|t| !t.is_empty());

        let entry = self
            .tokens
            .entry(user_id.to_string())
            .and_modify(|record| {
                record.access_token = access_token.clone();
                record.expires_at = expires_at;
                if refresh_token.is_some() {
                    record.refresh_token = refresh_token.clone();
                }
            })
            .or_insert_with(|| TokenRecord {
                user_id: user_id.to_string(),
                access_token: access_token.clone(),
                refresh_token: refresh_token.clone(),
                expires_at,
            });

        entry.value().clone()
    }

    /// Overwrite the access token of an existing record. Returns `None` for unknown users.
    pub fn update_access_token(
        &self,
        user_id: &str,
        access_token: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Option<TokenRecord> {
        let mut record = self.tokens.get_mut(user_id)?;
        record.access_token = access_token;
        record.expires_at = expires_at;
        Some(record.value().clone())
    }

    pub fn remove(&self, user_id: &str) -> Option<TokenRecord> {
        self.tokens.remove(user_id).map(|(_, record)| record)
    }

    pub fn all(&self) -> Vec<TokenRecord> {
        let mut records: Vec<TokenRecord> =
            self.tokens.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        records
    }

    pub fn user_ids(&self) -> Vec<String> {
        self.all().into_iter().map(|record| record.user_id).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
