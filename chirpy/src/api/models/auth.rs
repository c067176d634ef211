//! API request/response models for sessions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::users::UserResponse;

/// Successful login: the user plus a session token and a refresh token.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Session token (JWT), sent as `Authorization: Bearer` on user actions
    pub token: String,
    /// Refresh token, exchanged at `/api/refresh` for a new session token
    pub refresh_token: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// A freshly issued session token.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub token: String,
}
