//! API request and response models.
//!
//! These types are the JSON shapes of the HTTP API. Field names are snake_case. Store records in
//! [`crate::db::models`] are converted into response types with `From` so that password digests
//! and token records never reach a response body.

pub mod admin;
pub mod auth;
pub mod chirps;
pub mod users;
pub mod webhooks;
