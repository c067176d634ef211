//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Accounts** (`/api/users`): Registration and credential changes
//! - **Sessions** (`/api/login`, `/api/refresh`, `/api/revoke`): Token issuance and revocation
//! - **Chirps** (`/api/chirps/*`): Posting, reading and deleting chirps
//! - **Webhooks** (`/api/polka/webhooks`): Payment provider notifications
//! - **Maintenance** (`/admin/reset`): Development-only data reset
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`. The document is served
//! at `/api/openapi.json`.

pub mod handlers;
pub mod models;
