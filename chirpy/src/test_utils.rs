//! Shared fixtures for unit and HTTP tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::{
    AppState,
    api::models::{auth::LoginResponse, users::UserResponse},
    auth::session::SigningKey,
    clock::MockClock,
    config::{AuthConfig, Config, PasswordConfig},
    db::{
        errors::{DbError, Result as DbResult},
        handlers::{ChirpStore, InMemoryStore, RefreshTokenStore, Store, UserStore},
        models::{
            chirps::{ChirpCreateDBRequest, ChirpDBResponse, ChirpFilter},
            refresh_tokens::{RefreshToken, RefreshTokenCreateDBRequest},
            users::{UserCreateDBRequest, UserCredentialsUpdateDBRequest, UserDBResponse},
        },
    },
    types::{ChirpId, UserId},
};

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// In-memory store, fixed secret and cheap Argon2 parameters.
pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some(TEST_SECRET.to_string()),
        polka_key: None,
        auth: AuthConfig {
            password: PasswordConfig {
                argon2_memory_kib: 128,
                argon2_iterations: 1,
                argon2_parallelism: 1,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A fixed, arbitrary starting instant so time-dependent tests are reproducible.
pub fn test_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

/// Build state over a fresh in-memory store. The returned clock drives the state's time.
pub fn create_test_state(config: Config) -> (AppState, MockClock) {
    create_test_state_with_store(config, Arc::new(InMemoryStore::new()))
}

pub fn create_test_state_with_store(config: Config, store: Arc<dyn Store>) -> (AppState, MockClock) {
    let clock = MockClock::new(test_epoch());
    let secret = config.secret_key.clone().expect("test config must set secret_key");

    let state = AppState::builder()
        .store(store)
        .signing_key(Arc::new(SigningKey::from_secret(secret.as_bytes())))
        .clock(Arc::new(clock.clone()))
        .config(config)
        .build();

    (state, clock)
}

/// Full router over [`create_test_state`].
pub fn create_test_server(config: Config) -> (TestServer, AppState, MockClock) {
    create_test_server_with_store(config, Arc::new(InMemoryStore::new()))
}

pub fn create_test_server_with_store(config: Config, store: Arc<dyn Store>) -> (TestServer, AppState, MockClock) {
    let (state, clock) = create_test_state_with_store(config, store);
    let server = TestServer::new(crate::build_router(state.clone())).expect("Failed to create test server");
    (server, state, clock)
}

pub fn bearer(token: &str) -> (String, String) {
    ("authorization".to_string(), format!("Bearer {token}"))
}

pub fn api_key(key: &str) -> (String, String) {
    ("authorization".to_string(), format!("ApiKey {key}"))
}

pub async fn register_user(server: &TestServer, email: &str) -> UserResponse {
    let response = server
        .post("/api/users")
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<UserResponse>()
}

pub async fn login_user(server: &TestServer, email: &str) -> LoginResponse {
    let response = server
        .post("/api/login")
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status_ok();
    response.json::<LoginResponse>()
}

/// A store whose backend is unreachable: every operation fails with `DbError::Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

fn unavailable<T>() -> DbResult<T> {
    Err(DbError::Unavailable("connection refused".to_string()))
}

#[async_trait]
impl UserStore for UnavailableStore {
    async fn create_user(&self, _request: &UserCreateDBRequest) -> DbResult<UserDBResponse> {
        unavailable()
    }

    async fn get_user_by_email(&self, _email: &str) -> DbResult<Option<UserDBResponse>> {
        unavailable()
    }

    async fn get_user_by_id(&self, _id: UserId) -> DbResult<Option<UserDBResponse>> {
        unavailable()
    }

    async fn update_user_credentials(&self, _id: UserId, _request: &UserCredentialsUpdateDBRequest) -> DbResult<UserDBResponse> {
        unavailable()
    }

    async fn mark_user_upgraded(&self, _id: UserId) -> DbResult<UserDBResponse> {
        unavailable()
    }

    async fn delete_all_users(&self) -> DbResult<u64> {
        unavailable()
    }
}

#[async_trait]
impl ChirpStore for UnavailableStore {
    async fn create_chirp(&self, _request: &ChirpCreateDBRequest) -> DbResult<ChirpDBResponse> {
        unavailable()
    }

    async fn get_chirp(&self, _id: ChirpId) -> DbResult<Option<ChirpDBResponse>> {
        unavailable()
    }

    async fn get_chirp_owner(&self, _id: ChirpId) -> DbResult<Option<UserId>> {
        unavailable()
    }

    async fn list_chirps(&self, _filter: &ChirpFilter) -> DbResult<Vec<ChirpDBResponse>> {
        unavailable()
    }

    async fn delete_chirp(&self, _id: ChirpId) -> DbResult<bool> {
        unavailable()
    }
}

#[async_trait]
impl RefreshTokenStore for UnavailableStore {
    async fn create_refresh_token(&self, _request: &RefreshTokenCreateDBRequest) -> DbResult<RefreshToken> {
        unavailable()
    }

    async fn get_refresh_token(&self, _token: &str) -> DbResult<Option<RefreshToken>> {
        unavailable()
    }

    async fn revoke_refresh_token(&self, _token: &str, _revoked_at: DateTime<Utc>) -> DbResult<Option<RefreshToken>> {
        unavailable()
    }
}
