//! # chirpy: a small microblogging API
//!
//! `chirpy` lets users register, log in, post short messages ("chirps") and delete their own
//! chirps. A payment provider notifies it through a webhook when a user upgrades to Chirpy Red.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer. All
//! persistent state lives behind the [`db::handlers::Store`] trait, implemented for PostgreSQL
//! (through SQLx) and for a process-local in-memory map.
//!
//! ### Authentication
//!
//! Three kinds of credential reach the API, all in the `Authorization` header:
//!
//! - **Session tokens** are HS256 JWTs valid for one hour. They are stateless: nothing is
//!   persisted, and validation needs only the signing key and the clock.
//! - **Refresh tokens** are opaque random strings stored alongside the user. They live for sixty
//!   days, are exchanged for new session tokens at `/api/refresh`, and can be revoked.
//! - **API keys** authenticate the payment provider on the webhook endpoint.
//!
//! Mutations on chirps additionally pass an ownership check: the chirp is fetched first (404 if
//! absent) and its author compared with the caller (403 on mismatch).
//!
//! Time is read through an injected [`clock::Clock`], and the signing key and settings are carried
//! in [`AppState`] rather than globals, so every expiry rule is testable deterministically.
//!
//! ### Core Components
//!
//! - [`api`]: request/response models and route handlers
//! - [`auth`]: credential parsing, password hashing, tokens and ownership checks
//! - [`db`]: store traits, the PostgreSQL and in-memory implementations, and their records
//! - [`config`]: YAML + environment configuration
//! - [`errors`]: the error taxonomy and its HTTP mapping
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use chirpy::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = chirpy::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     chirpy::telemetry::init_telemetry(config.log_format)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! With `database.type: postgres` (or `DATABASE_URL` set) migrations run automatically on
//! start-up. With the default `memory` store all data is lost on shutdown.

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test;
#[cfg(test)]
pub mod test_utils;

use crate::{
    auth::{
        refresh_tokens::RefreshTokenManager,
        session::{SessionTokens, SigningKey},
    },
    clock::{Clock, SystemClock},
    config::DatabaseConfig,
    db::handlers::{InMemoryStore, PgStore, Store},
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    routing::{delete, get, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info};
use utoipa::OpenApi;

pub use types::{ChirpId, UserId};

/// Application state shared across all request handlers.
///
/// Everything in here is read-only after start-up; the store provides its own concurrency.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .store(Arc::new(InMemoryStore::new()))
///     .signing_key(Arc::new(SigningKey::from_secret(b"secret")))
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
    pub signing_key: Arc<SigningKey>,
    #[builder(default = system_clock())]
    pub clock: Arc<dyn Clock>,
}

fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

impl AppState {
    pub fn session_tokens(&self) -> SessionTokens<'_> {
        SessionTokens::new(&self.signing_key, &self.config.auth.session, &*self.clock)
    }

    pub fn refresh_tokens(&self) -> RefreshTokenManager<'_> {
        RefreshTokenManager::new(&*self.store, &*self.clock, self.config.auth.refresh_token.expiry)
    }
}

/// Get the chirpy database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Build the application router with every route and the tracing layer.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/healthz", get(api::handlers::health::healthz))
        // Accounts
        .route("/users", post(api::handlers::users::create_user))
        .route("/users", put(api::handlers::users::update_user))
        // Sessions
        .route("/login", post(api::handlers::auth::login))
        .route("/refresh", post(api::handlers::auth::refresh))
        .route("/revoke", post(api::handlers::auth::revoke))
        // Chirps
        .route("/chirps", post(api::handlers::chirps::create_chirp))
        .route("/chirps", get(api::handlers::chirps::list_chirps))
        .route("/chirps/{chirp_id}", get(api::handlers::chirps::get_chirp))
        .route("/chirps/{chirp_id}", delete(api::handlers::chirps::delete_chirp))
        // Payment provider
        .route("/polka/webhooks", post(api::handlers::webhooks::polka_webhook))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    let admin_routes = Router::new().route("/reset", post(api::handlers::admin::reset));

    Router::new()
        .nest("/api", api_routes)
        .nest("/admin", admin_routes)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Open the configured store, running migrations for PostgreSQL.
async fn setup_store(config: &Config) -> anyhow::Result<(Arc<dyn Store>, Option<PgPool>)> {
    match &config.database {
        DatabaseConfig::Memory => {
            info!("Using in-memory store; data will be lost on shutdown");
            Ok((Arc::new(InMemoryStore::new()), None))
        }
        DatabaseConfig::Postgres { url, pool } => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(pool.max_connections)
                .min_connections(pool.min_connections)
                .acquire_timeout(Duration::from_secs(pool.acquire_timeout_secs))
                .connect(url)
                .await?;

            migrator().run(&pg_pool).await?;
            info!("Connected to PostgreSQL and applied migrations");

            Ok((Arc::new(PgStore::new(pg_pool.clone())), Some(pg_pool)))
        }
    }
}

pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!(
            address = %config.bind_address(),
            platform = ?config.platform,
            "Starting chirpy"
        );

        let secret = config
            .secret_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("secret_key is required to sign session tokens"))?;
        let signing_key = Arc::new(SigningKey::from_secret(secret.as_bytes()));

        let (store, pool) = setup_store(&config).await?;

        let state = AppState::builder()
            .store(store)
            .config(config.clone())
            .signing_key(signing_key)
            .build();

        Ok(Self {
            router: build_router(state),
            config,
            pool,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Chirpy listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        Ok(())
    }
}
