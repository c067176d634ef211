//! Store models for users.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::UserId;

/// Store request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub email: String,
    pub hashed_password: String,
}

/// Store request for replacing a user's email and credential
#[derive(Debug, Clone)]
pub struct UserCredentialsUpdateDBRequest {
    pub email: String,
    pub hashed_password: String,
}

/// Store response for user operations
#[derive(Debug, Clone, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
}
