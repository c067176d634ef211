//! API request/response models for chirps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::chirps::{ChirpDBResponse, SortDirection};
use crate::types::{ChirpId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChirpCreate {
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChirpResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ChirpId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
}

impl From<ChirpDBResponse> for ChirpResponse {
    fn from(db: ChirpDBResponse) -> Self {
        Self {
            id: db.id,
            created_at: db.created_at,
            updated_at: db.updated_at,
            body: db.body,
            user_id: db.user_id,
        }
    }
}

/// Query parameters for listing chirps
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListChirpsQuery {
    /// Only chirps by this user (UUID)
    pub author_id: Option<String>,
    /// Order by creation time, `asc` (default) or `desc`. Any other value sorts ascending.
    #[param(value_type = Option<SortDirection>)]
    pub sort: Option<String>,
}

impl ListChirpsQuery {
    pub fn sort_direction(&self) -> SortDirection {
        match self.sort.as_deref().map(str::trim) {
            Some(raw) if raw.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}
