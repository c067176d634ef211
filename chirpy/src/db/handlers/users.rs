//! User store operations.

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use super::PgStore;
use crate::{
    db::{
        errors::{DbError, Result},
        models::users::{UserCreateDBRequest, UserCredentialsUpdateDBRequest, UserDBResponse},
    },
    types::{UserId, abbrev_uuid},
};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `UniqueViolation` if the email is taken.
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>>;

    async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>>;

    /// Replace a user's email and password digest. Fails with `NotFound` for unknown users.
    async fn update_user_credentials(&self, id: UserId, request: &UserCredentialsUpdateDBRequest) -> Result<UserDBResponse>;

    /// Set the upgraded (Chirpy Red) flag. Fails with `NotFound` for unknown users.
    async fn mark_user_upgraded(&self, id: UserId) -> Result<UserDBResponse>;

    /// Delete every user, cascading to their chirps and refresh tokens. Returns the number removed.
    async fn delete_all_users(&self) -> Result<u64>;
}

const USER_COLUMNS: &str = "id, created_at, updated_at, email, hashed_password, is_chirpy_red";

#[async_trait]
impl UserStore for PgStore {
    #[instrument(skip(self, request), err)]
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            r#"
            INSERT INTO users (id, email, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&request.email)
        .bind(&request.hashed_password)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self, email), err)]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update_user_credentials(&self, id: UserId, request: &UserCredentialsUpdateDBRequest) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            r#"
            UPDATE users
            SET email = $2, hashed_password = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.email)
        .bind(&request.hashed_password)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn mark_user_upgraded(&self, id: UserId) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            r#"
            UPDATE users
            SET is_chirpy_red = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn delete_all_users(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
