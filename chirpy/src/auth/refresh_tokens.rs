//! Long-lived opaque refresh tokens.
//!
//! A refresh token is 32 random bytes, base64url encoded, with no embedded structure. Its
//! meaning lives entirely in the store record. Refresh tokens are never rotated: the same token
//! keeps producing new session tokens until it expires or is revoked.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use rand::prelude::RngExt;
use rand::rng;
use std::time::Duration;
use tracing::instrument;

use crate::{
    clock::Clock,
    db::{handlers::Store, models::refresh_tokens::RefreshTokenCreateDBRequest},
    errors::{Error, Result},
    types::{UserId, abbrev_uuid},
};

/// What the store knows about a refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenLookup {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

/// Creates, resolves and revokes refresh tokens. Persistence is delegated to the store; expiry
/// is judged against the injected clock.
pub struct RefreshTokenManager<'a> {
    store: &'a dyn Store,
    clock: &'a dyn Clock,
    lifetime: Duration,
}

impl<'a> RefreshTokenManager<'a> {
    pub fn new(store: &'a dyn Store, clock: &'a dyn Clock, lifetime: Duration) -> Self {
        Self { store, clock, lifetime }
    }

    /// Generate and persist a new token for `user_id`.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn create(&self, user_id: UserId) -> Result<String> {
        let lifetime = chrono::Duration::from_std(self.lifetime).map_err(|e| Error::Internal {
            operation: format!("convert refresh token lifetime: {e}"),
        })?;

        let token = generate_refresh_token();
        self.store
            .create_refresh_token(&RefreshTokenCreateDBRequest {
                token: token.clone(),
                user_id,
                expires_at: self.clock.now() + lifetime,
            })
            .await?;

        Ok(token)
    }

    #[instrument(skip_all, err)]
    pub async fn lookup(&self, token: &str) -> Result<RefreshTokenLookup> {
        let record = self.store.get_refresh_token(token).await?.ok_or_else(not_found)?;

        Ok(RefreshTokenLookup {
            user_id: record.user_id,
            expires_at: record.expires_at,
            revoked: record.is_revoked(),
        })
    }

    /// Resolve a token to the user it was issued to, if it is still usable.
    ///
    /// Revocation is checked before expiry, so a token that is both reports `RevokedToken`.
    #[instrument(skip_all, err)]
    pub async fn authenticate(&self, token: &str) -> Result<UserId> {
        let lookup = self.lookup(token).await?;

        if lookup.revoked {
            return Err(Error::RevokedToken);
        }
        if self.clock.now() >= lookup.expires_at {
            return Err(Error::ExpiredToken);
        }

        Ok(lookup.user_id)
    }

    /// Revoke a token. Revoking twice succeeds both times and keeps the first revocation time.
    #[instrument(skip_all, err)]
    pub async fn revoke(&self, token: &str) -> Result<()> {
        self.store
            .revoke_refresh_token(token, self.clock.now())
            .await?
            .ok_or_else(not_found)?;
        Ok(())
    }
}

fn not_found() -> Error {
    Error::NotFound {
        resource: "Refresh token".to_string(),
        id: "<redacted>".to_string(),
    }
}

/// Generate a secure random refresh token
pub fn generate_refresh_token() -> String {
    // Generate 32 bytes (256 bits) of cryptographically secure random data
    let mut token_bytes = [0u8; 32];
    rng().fill(&mut token_bytes);

    // Encode as base64url without padding
    general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::MockClock,
        db::{
            handlers::{InMemoryStore, UserStore},
            models::users::UserCreateDBRequest,
        },
    };
    use chrono::Duration as ChronoDuration;

    const SIXTY_DAYS: Duration = Duration::from_secs(60 * 24 * 60 * 60);

    async fn setup() -> (InMemoryStore, MockClock, UserId) {
        let store = InMemoryStore::new();
        let user = store
            .create_user(&UserCreateDBRequest {
                email: "user@example.com".to_string(),
                hashed_password: "digest".to_string(),
            })
            .await
            .unwrap();
        (store, MockClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap()), user.id)
    }

    #[tokio::test]
    async fn test_create_then_authenticate() {
        let (store, clock, user_id) = setup().await;
        let manager = RefreshTokenManager::new(&store, &clock, SIXTY_DAYS);

        let token = manager.create(user_id).await.unwrap();
        assert_eq!(manager.authenticate(&token).await.unwrap(), user_id);

        let lookup = manager.lookup(&token).await.unwrap();
        assert_eq!(lookup.user_id, user_id);
        assert_eq!(lookup.expires_at, clock.now() + ChronoDuration::days(60));
        assert!(!lookup.revoked);
    }

    #[tokio::test]
    async fn test_revoked_token() {
        let (store, clock, user_id) = setup().await;
        let manager = RefreshTokenManager::new(&store, &clock, SIXTY_DAYS);

        let token = manager.create(user_id).await.unwrap();
        manager.revoke(&token).await.unwrap();

        assert!(matches!(manager.authenticate(&token).await, Err(Error::RevokedToken)));
        assert!(manager.lookup(&token).await.unwrap().revoked);

        // Revoking again is harmless and never un-revokes
        manager.revoke(&token).await.unwrap();
        assert!(matches!(manager.authenticate(&token).await, Err(Error::RevokedToken)));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (store, clock, _) = setup().await;
        let manager = RefreshTokenManager::new(&store, &clock, SIXTY_DAYS);

        assert!(matches!(manager.authenticate("nope").await, Err(Error::NotFound { .. })));
        assert!(matches!(manager.lookup("nope").await, Err(Error::NotFound { .. })));
        assert!(matches!(manager.revoke("nope").await, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let (store, clock, user_id) = setup().await;
        let manager = RefreshTokenManager::new(&store, &clock, SIXTY_DAYS);

        let token = manager.create(user_id).await.unwrap();

        clock.advance(ChronoDuration::days(60) - ChronoDuration::seconds(1));
        assert_eq!(manager.authenticate(&token).await.unwrap(), user_id);

        // Expiry is exclusive
        clock.advance(ChronoDuration::seconds(1));
        assert!(matches!(manager.authenticate(&token).await, Err(Error::ExpiredToken)));
    }

    #[tokio::test]
    async fn test_revoked_takes_precedence_over_expired() {
        let (store, clock, user_id) = setup().await;
        let manager = RefreshTokenManager::new(&store, &clock, SIXTY_DAYS);

        let token = manager.create(user_id).await.unwrap();
        manager.revoke(&token).await.unwrap();
        clock.advance(ChronoDuration::days(61));

        assert!(matches!(manager.authenticate(&token).await, Err(Error::RevokedToken)));
    }

    #[tokio::test]
    async fn test_tokens_per_device_are_independent() {
        let (store, clock, user_id) = setup().await;
        let manager = RefreshTokenManager::new(&store, &clock, SIXTY_DAYS);

        let laptop = manager.create(user_id).await.unwrap();
        let phone = manager.create(user_id).await.unwrap();
        assert_ne!(laptop, phone);

        manager.revoke(&laptop).await.unwrap();
        assert!(matches!(manager.authenticate(&laptop).await, Err(Error::RevokedToken)));
        assert_eq!(manager.authenticate(&phone).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_create_for_unknown_user_fails() {
        let (store, clock, _) = setup().await;
        let manager = RefreshTokenManager::new(&store, &clock, SIXTY_DAYS);

        let err = manager.create(uuid::Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_store_outage_is_not_an_auth_failure() {
        let store = crate::test_utils::UnavailableStore;
        let clock = MockClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        let manager = RefreshTokenManager::new(&store, &clock, SIXTY_DAYS);

        let err = manager.authenticate("some-token").await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable { .. }));
        assert!(err.is_retryable());

        assert!(matches!(manager.lookup("some-token").await, Err(Error::StoreUnavailable { .. })));
        assert!(matches!(manager.revoke("some-token").await, Err(Error::StoreUnavailable { .. })));
        assert!(matches!(
            manager.create(uuid::Uuid::new_v4()).await,
            Err(Error::StoreUnavailable { .. })
        ));
    }

    #[test]
    fn test_generate_refresh_token() {
        let token1 = generate_refresh_token();
        let token2 = generate_refresh_token();

        // Tokens should be different
        assert_ne!(token1, token2);

        // Tokens should be base64url encoded (43 chars for 32 bytes)
        assert_eq!(token1.len(), 43);
        assert!(token1.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert!(!token1.contains('='));
    }
}
