//! Store record models matching table schemas.
//!
//! Each model struct corresponds to a table row and derives `sqlx::FromRow`; the in-memory store
//! builds the same structs directly. These are distinct from the API models in
//! [`crate::api::models`] so the storage and JSON shapes can evolve independently.
//!
//! - [`users`]: User accounts and password digests
//! - [`chirps`]: Chirps and list filters
//! - [`refresh_tokens`]: Long-lived opaque refresh tokens

pub mod chirps;
pub mod refresh_tokens;
pub mod users;
