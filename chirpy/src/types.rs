//! Common type definitions.
//!
//! # ID Types
//!
//! Entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: User account identifier (the subject of every session token)
//! - [`ChirpId`]: Chirp identifier
//!
//! # Utility Functions
//!
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging

use std::fmt;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type ChirpId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Mutating operations that go through an ownership or environment check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    DeleteOwn,
    DeleteAll,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::DeleteOwn => write!(f, "delete"),
            Operation::DeleteAll => write!(f, "delete all"),
        }
    }
}
