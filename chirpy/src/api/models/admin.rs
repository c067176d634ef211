//! API response models for maintenance endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    /// Number of users deleted, together with their chirps and refresh tokens
    pub deleted_users: u64,
}
