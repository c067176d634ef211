//! Refresh token store operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use super::PgStore;
use crate::{
    db::{
        errors::Result,
        models::refresh_tokens::{RefreshToken, RefreshTokenCreateDBRequest},
    },
    types::abbrev_uuid,
};

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist a new, unrevoked token. Fails with `UniqueViolation` on a token collision and
    /// `ForeignKeyViolation` if the user does not exist.
    async fn create_refresh_token(&self, request: &RefreshTokenCreateDBRequest) -> Result<RefreshToken>;

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>>;

    /// Mark a token revoked at `revoked_at`. A token that is already revoked keeps its original
    /// revocation time. Returns `None` if no such token exists.
    async fn revoke_refresh_token(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<Option<RefreshToken>>;
}

const REFRESH_TOKEN_COLUMNS: &str = "token, user_id, created_at, updated_at, expires_at, revoked_at";

#[async_trait]
impl RefreshTokenStore for PgStore {
    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create_refresh_token(&self, request: &RefreshTokenCreateDBRequest) -> Result<RefreshToken> {
        let token = sqlx::query_as::<_, RefreshToken>(&format!(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING {REFRESH_TOKEN_COLUMNS}
            "#
        ))
        .bind(&request.token)
        .bind(request.user_id)
        .bind(request.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    #[instrument(skip_all, err)]
    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(&format!(
            "SELECT {REFRESH_TOKEN_COLUMNS} FROM refresh_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    #[instrument(skip(self, token), err)]
    async fn revoke_refresh_token(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(&format!(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $2),
                updated_at = CASE WHEN revoked_at IS NULL THEN $2 ELSE updated_at END
            WHERE token = $1
            RETURNING {REFRESH_TOKEN_COLUMNS}
            "#
        ))
        .bind(token)
        .bind(revoked_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }
}
