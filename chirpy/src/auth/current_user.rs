//! Request extractors that resolve credentials to callers.
//!
//! - [`CurrentUser`]: a valid session token in `Authorization: Bearer`
//! - [`BearerToken`]: the raw bearer value, for endpoints that take a refresh token
//! - [`WebhookCaller`]: the payment provider's API key in `Authorization: ApiKey`

use axum::{extract::FromRequestParts, http::request::Parts};
use subtle::ConstantTimeEq;
use tracing::{debug, instrument};

use crate::{
    AppState,
    auth::credentials,
    errors::{Error, Result},
    types::{UserId, abbrev_uuid},
};

/// The user a valid session token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state), err)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = credentials::bearer_token(&parts.headers)?;
        let id = state.session_tokens().validate(&token)?;
        debug!(user_id = %abbrev_uuid(&id), "Authenticated session token");
        Ok(CurrentUser { id })
    }
}

/// The value of an `Authorization: Bearer` header, unvalidated.
pub struct BearerToken(pub String);

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        credentials::bearer_token(&parts.headers).map(BearerToken)
    }
}

/// A caller that presented the configured webhook API key.
#[derive(Debug, Clone, Copy)]
pub struct WebhookCaller;

impl FromRequestParts<AppState> for WebhookCaller {
    type Rejection = Error;

    #[instrument(skip(parts, state), err)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let presented = credentials::api_key(&parts.headers)?;
        let invalid = || Error::Unauthenticated {
            message: Some("Invalid API key".to_string()),
        };

        let expected = state.config.polka_key.as_deref().filter(|key| !key.is_empty()).ok_or_else(invalid)?;
        if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(WebhookCaller)
        } else {
            Err(invalid())
        }
    }
}
