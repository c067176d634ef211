//! Parsing of the `Authorization` header into a typed credential.
//!
//! The header must be exactly `<Scheme> <value>`: two tokens separated by a single space, with
//! the scheme matched case-sensitively. The value may be empty (`"Bearer "`), in which case the
//! empty string is returned and rejected later by whatever validates it.

use axum::http::{HeaderMap, header::AUTHORIZATION};

use crate::errors::{Error, Result};

/// A credential pulled from the request. Bearer values are either session tokens or refresh
/// tokens depending on the endpoint; the extractor does not distinguish them.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    ApiKey(String),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Credential::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
        }
    }
}

/// Extract whichever credential the request carries.
pub fn extract_credential(headers: &HeaderMap) -> Result<Credential> {
    let (scheme, value) = split_authorization(headers)?;
    match scheme {
        "Bearer" => Ok(Credential::Bearer(value.to_string())),
        "ApiKey" => Ok(Credential::ApiKey(value.to_string())),
        _ => Err(Error::MalformedCredential),
    }
}

/// `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<String> {
    match extract_credential(headers)? {
        Credential::Bearer(token) => Ok(token),
        Credential::ApiKey(_) => Err(Error::MalformedCredential),
    }
}

/// `Authorization: ApiKey <key>`
pub fn api_key(headers: &HeaderMap) -> Result<String> {
    match extract_credential(headers)? {
        Credential::ApiKey(key) => Ok(key),
        Credential::Bearer(_) => Err(Error::MalformedCredential),
    }
}

fn split_authorization(headers: &HeaderMap) -> Result<(&str, &str)> {
    let header = headers.get(AUTHORIZATION).ok_or(Error::MissingCredential)?;
    let value = header.to_str().map_err(|_| Error::MalformedCredential)?;
    if value.is_empty() {
        return Err(Error::MissingCredential);
    }

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(credential), None) => Ok((scheme, credential)),
        _ => Err(Error::MalformedCredential),
    }
}
