//! Chirp store operations.

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use super::PgStore;
use crate::{
    db::{
        errors::Result,
        models::chirps::{ChirpCreateDBRequest, ChirpDBResponse, ChirpFilter, SortDirection},
    },
    types::{ChirpId, UserId, abbrev_uuid},
};

#[async_trait]
pub trait ChirpStore: Send + Sync {
    /// Insert a chirp. Fails with `ForeignKeyViolation` if the author does not exist.
    async fn create_chirp(&self, request: &ChirpCreateDBRequest) -> Result<ChirpDBResponse>;

    async fn get_chirp(&self, id: ChirpId) -> Result<Option<ChirpDBResponse>>;

    /// Owner of a chirp, used by ownership checks.
    async fn get_chirp_owner(&self, id: ChirpId) -> Result<Option<UserId>>;

    async fn list_chirps(&self, filter: &ChirpFilter) -> Result<Vec<ChirpDBResponse>>;

    /// Returns whether a chirp was deleted.
    async fn delete_chirp(&self, id: ChirpId) -> Result<bool>;
}

const CHIRP_COLUMNS: &str = "id, created_at, updated_at, body, user_id";

#[async_trait]
impl ChirpStore for PgStore {
    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create_chirp(&self, request: &ChirpCreateDBRequest) -> Result<ChirpDBResponse> {
        let chirp = sqlx::query_as::<_, ChirpDBResponse>(&format!(
            r#"
            INSERT INTO chirps (id, body, user_id)
            VALUES ($1, $2, $3)
            RETURNING {CHIRP_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&request.body)
        .bind(request.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(chirp)
    }

    #[instrument(skip(self), fields(chirp_id = %abbrev_uuid(&id)), err)]
    async fn get_chirp(&self, id: ChirpId) -> Result<Option<ChirpDBResponse>> {
        let chirp = sqlx::query_as::<_, ChirpDBResponse>(&format!("SELECT {CHIRP_COLUMNS} FROM chirps WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(chirp)
    }

    #[instrument(skip(self), fields(chirp_id = %abbrev_uuid(&id)), err)]
    async fn get_chirp_owner(&self, id: ChirpId) -> Result<Option<UserId>> {
        let owner = sqlx::query_scalar::<_, UserId>("SELECT user_id FROM chirps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner)
    }

    #[instrument(skip(self), err)]
    async fn list_chirps(&self, filter: &ChirpFilter) -> Result<Vec<ChirpDBResponse>> {
        let direction = match filter.sort {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };

        let chirps = sqlx::query_as::<_, ChirpDBResponse>(&format!(
            r#"
            SELECT {CHIRP_COLUMNS}
            FROM chirps
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at {direction}, id {direction}
            "#
        ))
        .bind(filter.author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(chirps)
    }

    #[instrument(skip(self), fields(chirp_id = %abbrev_uuid(&id)), err)]
    async fn delete_chirp(&self, id: ChirpId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
