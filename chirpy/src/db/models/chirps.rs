//! Store models for chirps.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::{ChirpId, UserId};

/// Store request for creating a chirp
#[derive(Debug, Clone)]
pub struct ChirpCreateDBRequest {
    pub user_id: UserId,
    pub body: String,
}

/// Store response for chirp operations
#[derive(Debug, Clone, FromRow)]
pub struct ChirpDBResponse {
    pub id: ChirpId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: UserId,
}

/// Ordering of chirp listings by creation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Filter for listing chirps
#[derive(Debug, Clone, Default)]
pub struct ChirpFilter {
    pub author_id: Option<UserId>,
    pub sort: SortDirection,
}
