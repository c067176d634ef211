//! JWT session token creation and verification.
//!
//! Session tokens are HS256-signed JWTs carrying `iss`, `sub` (the user id), `iat` and `exp`.
//! They are never persisted: a token is valid when its signature verifies under the process
//! signing key and the injected clock reads between `iat` and `exp` (plus leeway).

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    clock::Clock,
    config::SessionConfig,
    errors::{Error, Result},
    types::{UserId, abbrev_uuid},
};

/// Symmetric key for signing and verifying session tokens.
///
/// Loaded once from `secret_key` at start-up and shared read-only.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// JWT session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub iss: String, // Issuer
    pub sub: String, // Subject (user ID)
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expiration time
}

/// Issues and validates session tokens against one key, one set of settings and one clock.
pub struct SessionTokens<'a> {
    key: &'a SigningKey,
    config: &'a SessionConfig,
    clock: &'a dyn Clock,
}

impl<'a> SessionTokens<'a> {
    pub fn new(key: &'a SigningKey, config: &'a SessionConfig, clock: &'a dyn Clock) -> Self {
        Self { key, config, clock }
    }

    /// Create a session token for a user
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub fn issue(&self, user_id: UserId) -> Result<String> {
        let now = self.clock.now();
        let expiry = chrono::Duration::from_std(self.config.expiry).map_err(|e| Error::Internal {
            operation: format!("convert session expiry: {e}"),
        })?;

        let claims = SessionClaims {
            iss: self.config.issuer.clone(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + expiry).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.key.encoding).map_err(|e| Error::Internal {
            operation: format!("create JWT: {e}"),
        })
    }

    /// Verify a session token and return the user it was issued to.
    ///
    /// The signature is checked before any claim is read. Expiry is then compared against the
    /// injected clock with `leeway` of tolerance; the issued-at check gets no leeway.
    #[instrument(skip_all, err)]
    pub fn validate(&self, token: &str) -> Result<UserId> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time-based claims are checked below against the injected clock
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["iss", "sub", "iat", "exp"]);
        validation.set_issuer(&[self.config.issuer.as_str()]);

        let claims = decode::<SessionClaims>(token, &self.key.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Error::InvalidSignature,

                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_)
                | ErrorKind::MissingRequiredClaim(_)
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::InvalidSubject
                | ErrorKind::InvalidAlgorithmName => Error::MalformedToken,

                ErrorKind::ExpiredSignature => Error::ExpiredToken,
                ErrorKind::ImmatureSignature => Error::ImmatureToken,

                _ => Error::Internal {
                    operation: format!("JWT verification: {e}"),
                },
            })?
            .claims;

        let now = self.clock.now().timestamp();
        let leeway = i64::try_from(self.config.leeway.as_secs()).unwrap_or(i64::MAX);

        if claims.exp.saturating_add(leeway) < now {
            return Err(Error::ExpiredToken);
        }
        if claims.iat > now {
            return Err(Error::ImmatureToken);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| Error::InvalidSubject)
    }
}
