//! Authentication and authorization.
//!
//! # Credentials
//!
//! Every authenticated request carries exactly one `Authorization` header:
//!
//! - `Bearer <session token>`: a short-lived signed JWT, for user actions
//! - `Bearer <refresh token>`: a long-lived opaque token, only on `/api/refresh` and `/api/revoke`
//! - `ApiKey <key>`: the payment provider's shared key, only on the webhook endpoint
//!
//! # Flow
//!
//! ```text
//! request ─→ credentials ─┬─→ password (login)
//!                         ├─→ session::validate (user actions) ─→ permissions (mutations)
//!                         └─→ refresh_tokens::authenticate ─→ session::issue
//! ```
//!
//! # Modules
//!
//! - [`credentials`]: Parse the `Authorization` header
//! - [`password`]: Argon2id hashing and verification
//! - [`session`]: Issue and validate session tokens
//! - [`refresh_tokens`]: Create, resolve and revoke refresh tokens
//! - [`permissions`]: Ownership checks
//! - [`current_user`]: Axum extractors built on the above
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use chirpy::auth::current_user::CurrentUser;
//!
//! async fn protected_handler(user: CurrentUser) -> String {
//!     format!("Hello, {}!", user.id)
//! }
//! ```

pub mod credentials;
pub mod current_user;
pub mod password;
pub mod permissions;
pub mod refresh_tokens;
pub mod session;
