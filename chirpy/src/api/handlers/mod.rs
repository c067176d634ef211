//! HTTP request handlers for all API endpoints.
//!
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication and ownership checks
//! - Calling the store
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`admin`]: Development-only maintenance
//! - [`auth`]: Login, session refresh and refresh token revocation
//! - [`chirps`]: Chirp creation, listing, retrieval and deletion
//! - [`health`]: Liveness probe
//! - [`users`]: Registration and credential changes
//! - [`webhooks`]: Payment provider notifications
//!
//! # Authentication
//!
//! Handlers that act on behalf of a user take a [`crate::auth::current_user::CurrentUser`]
//! argument; the extractor rejects the request before the handler runs if the session token is
//! missing or invalid.

pub mod admin;
pub mod auth;
pub mod chirps;
pub mod health;
pub mod users;
pub mod webhooks;

use crate::auth::password::{self, Argon2Params};
use crate::errors::{Error, Result};

/// Hash a password on a blocking thread to avoid blocking the async runtime.
pub(crate) async fn hash_password_blocking(password: String, params: Argon2Params) -> Result<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&password, params))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}
