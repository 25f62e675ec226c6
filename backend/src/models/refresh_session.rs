//! Server-tracked refresh session backing the opaque refresh token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshSession {
    pub id: i64,
    pub user_id: Uuid,
    /// Opaque single-use token; deleted on refresh, logout, or expiry.
    pub refresh_token: Uuid,
    /// Lifetime in seconds from `created_at`.
    pub expires_in: i64,
    pub created_at: DateTime<Utc>,
}

impl RefreshSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.created_at + Duration::seconds(self.expires_in)
    }
}
