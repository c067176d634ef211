//! Store models for refresh tokens.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::UserId;

/// Store entity model. `revoked_at` is a tombstone: once set it is never cleared.
#[derive(Clone, FromRow)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshToken")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("expires_at", &self.expires_at)
            .field("revoked_at", &self.revoked_at)
            .finish()
    }
}

/// Request for persisting a newly generated refresh token
#[derive(Clone)]
pub struct RefreshTokenCreateDBRequest {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}
