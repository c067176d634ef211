//! Ownership checks for mutating operations.
//!
//! A resource is fetched first and its owner compared second. A missing resource is therefore
//! reported as `NotFound` (404) even to a caller who would not have owned it, and `Forbidden`
//! (403) only ever refers to a resource that exists.

use tracing::instrument;

use crate::{
    db::handlers::Store,
    errors::{Error, Result},
    types::{ChirpId, Operation, UserId, abbrev_uuid},
};

/// Allow `requester` to perform `action` on a resource owned by `owner`.
pub fn authorize(requester: UserId, owner: UserId, action: Operation, resource: &str) -> Result<()> {
    if requester == owner {
        Ok(())
    } else {
        Err(Error::Forbidden {
            action,
            resource: resource.to_string(),
        })
    }
}

/// Look up a chirp's owner and require it to be `requester`.
#[instrument(skip(store), fields(chirp_id = %abbrev_uuid(&chirp_id), user_id = %abbrev_uuid(&requester)), err)]
pub async fn require_chirp_owner(store: &dyn Store, chirp_id: ChirpId, requester: UserId, action: Operation) -> Result<()> {
    let owner = store.get_chirp_owner(chirp_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Chirp".to_string(),
        id: chirp_id.to_string(),
    })?;

    authorize(requester, owner, action, "chirp")
}
