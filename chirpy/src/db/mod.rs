//! Store layer for data persistence and access.
//!
//! Everything persistent (users, chirps, refresh tokens) lives behind the [`handlers::Store`]
//! trait. Request handlers and the auth components only ever see `&dyn Store`, so the same code
//! runs against PostgreSQL in production and against an in-process store in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers, auth components)
//! └──────┬──────┘
//!        │ &dyn Store
//!        ↓
//! ┌─────────────┐
//! │   Stores    │  (db::handlers - PgStore / InMemoryStore)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - store records)
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Store traits and their PostgreSQL and in-memory implementations
//! - [`models`]: Record structures matching table schemas
//! - [`errors`]: Store-specific error types
//!
//! # Consistency
//!
//! Every operation is a single statement (or a single map operation in memory). Nothing is
//! cached above the store, so a revoked refresh token or a deleted chirp is visible to the very
//! next read.
//!
//! # Migrations
//!
//! Migrations are managed by SQLx and located in the `migrations/` directory. The
//! [`crate::migrator`] function provides access to the migrator:
//!
//! ```ignore
//! chirpy::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
