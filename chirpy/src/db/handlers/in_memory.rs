//! In-process store for tests and `database.type: memory`.
//!
//! Mirrors the PostgreSQL schema rules: unique emails, chirps and refresh tokens must reference
//! an existing user, deleting users cascades, and revocation never clears `revoked_at`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::instrument;
use uuid::Uuid;

use super::{ChirpStore, RefreshTokenStore, UserStore};
use crate::{
    db::{
        errors::{DbError, Result},
        models::{
            chirps::{ChirpCreateDBRequest, ChirpDBResponse, ChirpFilter, SortDirection},
            refresh_tokens::{RefreshToken, RefreshTokenCreateDBRequest},
            users::{UserCreateDBRequest, UserCredentialsUpdateDBRequest, UserDBResponse},
        },
    },
    types::{ChirpId, UserId, abbrev_uuid},
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: DashMap<UserId, UserDBResponse>,
    emails: DashMap<String, UserId>,
    // Insertion sequence breaks ties between chirps created in the same instant
    chirps: DashMap<ChirpId, (u64, ChirpDBResponse)>,
    chirp_sequence: AtomicU64,
    refresh_tokens: DashMap<String, RefreshToken>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken() -> DbError {
        DbError::UniqueViolation {
            constraint: Some("users_email_key".to_string()),
            table: Some("users".to_string()),
            message: "duplicate key value violates unique constraint \"users_email_key\"".to_string(),
        }
    }

    fn missing_user(table: &str) -> DbError {
        DbError::ForeignKeyViolation {
            constraint: Some(format!("{table}_user_id_fkey")),
            table: Some(table.to_string()),
            message: format!("insert on table \"{table}\" violates foreign key constraint"),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    #[instrument(skip(self, request), err)]
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let id = Uuid::new_v4();
        match self.emails.entry(request.email.clone()) {
            Entry::Occupied(_) => return Err(Self::email_taken()),
            Entry::Vacant(entry) => {
                entry.insert(id);
            }
        }

        let now = Utc::now();
        let user = UserDBResponse {
            id,
            created_at: now,
            updated_at: now,
            email: request.email.clone(),
            hashed_password: request.hashed_password.clone(),
            is_chirpy_red: false,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    #[instrument(skip(self, email), err)]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        let Some(id) = self.emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|user| user.clone()))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        Ok(self.users.get(&id).map(|user| user.clone()))
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update_user_credentials(&self, id: UserId, request: &UserCredentialsUpdateDBRequest) -> Result<UserDBResponse> {
        let old_email = self.users.get(&id).map(|user| user.email.clone()).ok_or(DbError::NotFound)?;

        if old_email != request.email {
            match self.emails.entry(request.email.clone()) {
                Entry::Occupied(_) => return Err(Self::email_taken()),
                Entry::Vacant(entry) => {
                    entry.insert(id);
                }
            }
        }

        let Some(mut user) = self.users.get_mut(&id) else {
            // Deleted concurrently; release the email we just claimed
            self.emails.remove(&request.email);
            return Err(DbError::NotFound);
        };
        user.email = request.email.clone();
        user.hashed_password = request.hashed_password.clone();
        user.updated_at = Utc::now();
        let updated = user.clone();
        drop(user);

        if old_email != request.email {
            self.emails.remove(&old_email);
        }
        Ok(updated)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn mark_user_upgraded(&self, id: UserId) -> Result<UserDBResponse> {
        let mut user = self.users.get_mut(&id).ok_or(DbError::NotFound)?;
        user.is_chirpy_red = true;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    #[instrument(skip(self), err)]
    async fn delete_all_users(&self) -> Result<u64> {
        let count = self.users.len() as u64;
        self.refresh_tokens.clear();
        self.chirps.clear();
        self.emails.clear();
        self.users.clear();
        Ok(count)
    }
}

#[async_trait]
impl ChirpStore for InMemoryStore {
    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create_chirp(&self, request: &ChirpCreateDBRequest) -> Result<ChirpDBResponse> {
        if !self.users.contains_key(&request.user_id) {
            return Err(Self::missing_user("chirps"));
        }

        let now = Utc::now();
        let chirp = ChirpDBResponse {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: request.body.clone(),
            user_id: request.user_id,
        };
        let sequence = self.chirp_sequence.fetch_add(1, Ordering::SeqCst);
        self.chirps.insert(chirp.id, (sequence, chirp.clone()));
        Ok(chirp)
    }

    #[instrument(skip(self), fields(chirp_id = %abbrev_uuid(&id)), err)]
    async fn get_chirp(&self, id: ChirpId) -> Result<Option<ChirpDBResponse>> {
        Ok(self.chirps.get(&id).map(|entry| entry.1.clone()))
    }

    #[instrument(skip(self), fields(chirp_id = %abbrev_uuid(&id)), err)]
    async fn get_chirp_owner(&self, id: ChirpId) -> Result<Option<UserId>> {
        Ok(self.chirps.get(&id).map(|entry| entry.1.user_id))
    }

    #[instrument(skip(self), err)]
    async fn list_chirps(&self, filter: &ChirpFilter) -> Result<Vec<ChirpDBResponse>> {
        let mut chirps: Vec<(u64, ChirpDBResponse)> = self
            .chirps
            .iter()
            .filter(|entry| filter.author_id.is_none_or(|author| entry.1.user_id == author))
            .map(|entry| entry.value().clone())
            .collect();

        chirps.sort_by_key(|(sequence, chirp)| (chirp.created_at, *sequence));
        if filter.sort == SortDirection::Desc {
            chirps.reverse();
        }

        Ok(chirps.into_iter().map(|(_, chirp)| chirp).collect())
    }

    #[instrument(skip(self), fields(chirp_id = %abbrev_uuid(&id)), err)]
    async fn delete_chirp(&self, id: ChirpId) -> Result<bool> {
        Ok(self.chirps.remove(&id).is_some())
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create_refresh_token(&self, request: &RefreshTokenCreateDBRequest) -> Result<RefreshToken> {
        if !self.users.contains_key(&request.user_id) {
            return Err(Self::missing_user("refresh_tokens"));
        }

        let now = Utc::now();
        let record = RefreshToken {
            token: request.token.clone(),
            user_id: request.user_id,
            created_at: now,
            updated_at: now,
            expires_at: request.expires_at,
            revoked_at: None,
        };

        match self.refresh_tokens.entry(request.token.clone()) {
            Entry::Occupied(_) => Err(DbError::UniqueViolation {
                constraint: Some("refresh_tokens_pkey".to_string()),
                table: Some("refresh_tokens".to_string()),
                message: "duplicate refresh token".to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                Ok(record)
            }
        }
    }

    #[instrument(skip_all, err)]
    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        Ok(self.refresh_tokens.get(token).map(|record| record.clone()))
    }

    #[instrument(skip(self, token), err)]
    async fn revoke_refresh_token(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<Option<RefreshToken>> {
        let Some(mut record) = self.refresh_tokens.get_mut(token) else {
            return Ok(None);
        };
        if record.revoked_at.is_none() {
            record.revoked_at = Some(revoked_at);
            record.updated_at = revoked_at;
        }
        Ok(Some(record.clone()))
    }
}
