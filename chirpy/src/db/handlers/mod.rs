//! Store implementations.
//!
//! Each entity has a trait describing the operations the application needs from the store:
//!
//! - [`UserStore`]: user accounts and credentials
//! - [`ChirpStore`]: chirps and their owners
//! - [`RefreshTokenStore`]: refresh token records
//!
//! [`Store`] is the union of the three and is what [`AppState`](crate::AppState) holds as
//! `Arc<dyn Store>`. Two implementations exist:
//!
//! - [`PgStore`]: PostgreSQL through a SQLx pool (the entity modules hold its queries)
//! - [`InMemoryStore`]: `DashMap`-backed, for tests and `database.type: memory`

pub mod chirps;
pub mod in_memory;
pub mod refresh_tokens;
pub mod users;

pub use chirps::ChirpStore;
pub use in_memory::InMemoryStore;
pub use refresh_tokens::RefreshTokenStore;
pub use users::UserStore;

use sqlx::PgPool;

/// Everything the application persists.
pub trait Store: UserStore + ChirpStore + RefreshTokenStore {}

impl<T> Store for T where T: UserStore + ChirpStore + RefreshTokenStore {}

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
