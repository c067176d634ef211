use crate::db::errors::DbError;
use crate::types::Operation;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// No Authorization header on a request that needs one
    #[error("Missing authorization header")]
    MissingCredential,

    /// Authorization header present but not `<Scheme> <value>` with the expected scheme
    #[error("Malformed authorization header")]
    MalformedCredential,

    /// A stored password digest could not be parsed
    #[error("Stored credential has an invalid format")]
    InvalidCredentialFormat,

    /// Session token signature does not verify under the signing key
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Not a session token at all (segments, encoding, or claims)
    #[error("Malformed token")]
    MalformedToken,

    /// Session or refresh token is past its expiry
    #[error("Token has expired")]
    ExpiredToken,

    /// Session token claims an issue time in the future
    #[error("Token is not yet valid")]
    ImmatureToken,

    /// Refresh token has been revoked
    #[error("Token has been revoked")]
    RevokedToken,

    /// Session token subject is not a user id
    #[error("Token subject is not a valid user id")]
    InvalidSubject,

    /// Authentication failed for a reason the caller gets a fixed message for
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Requester does not own the resource being mutated
    #[error("Insufficient permissions to {action} {resource}")]
    Forbidden { action: Operation, resource: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Conflict error, e.g., for unique constraint violations
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The store could not be reached
    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Store operation error
    #[error(transparent)]
    Database(DbError),
}

impl From<DbError> for Error {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Unavailable(message) => Error::StoreUnavailable { message },
            other => Error::Database(other),
        }
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingCredential
            | Error::MalformedCredential
            | Error::InvalidCredentialFormat
            | Error::InvalidSignature
            | Error::MalformedToken
            | Error::ExpiredToken
            | Error::ImmatureToken
            | Error::RevokedToken
            | Error::InvalidSubject
            | Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Only a store outage may be retried by the caller, and only for idempotent reads.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::StoreUnavailable { .. } | Error::Database(DbError::Unavailable(_))
        )
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingCredential => "Missing authorization header".to_string(),
            Error::MalformedCredential => "Malformed authorization header".to_string(),
            Error::InvalidCredentialFormat => "Incorrect email or password".to_string(),
            Error::InvalidSignature | Error::MalformedToken | Error::InvalidSubject | Error::ImmatureToken => {
                "Invalid token".to_string()
            }
            Error::ExpiredToken => "Token has expired".to_string(),
            Error::RevokedToken => "Token has been revoked".to_string(),
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::Forbidden { action, resource } => format!("Insufficient permissions to {action} {resource}"),
            Error::NotFound { resource, .. } => format!("{resource} not found"),
            Error::BadRequest { message } => message.clone(),
            Error::Conflict { message } => message.clone(),
            Error::StoreUnavailable { .. } => "Service temporarily unavailable".to_string(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { table, constraint, .. } => match (table.as_deref(), constraint.as_deref()) {
                    (Some("users"), Some(c)) if c.contains("email") => "An account with this email address already exists".to_string(),
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::Unavailable(_) => "Service temporarily unavailable".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::StoreUnavailable { .. } | Error::Database(_) | Error::Conflict { .. } => {
                tracing::warn!("Store error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
            _ => {
                tracing::info!("Authorization error: {}", self);
            }
        }

        let status = self.status_code();
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
