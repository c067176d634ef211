use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    api::models::chirps::{ChirpCreate, ChirpResponse, ListChirpsQuery},
    auth::{current_user::CurrentUser, permissions},
    db::{
        errors::DbError,
        models::chirps::{ChirpCreateDBRequest, ChirpFilter},
    },
    errors::{Error, Result},
    types::{ChirpId, Operation, abbrev_uuid},
};

fn parse_chirp_id(raw: &str) -> Result<ChirpId> {
    Uuid::parse_str(raw).map_err(|_| Error::BadRequest {
        message: "Invalid chirp id".to_string(),
    })
}

fn chirp_not_found(id: ChirpId) -> Error {
    Error::NotFound {
        resource: "Chirp".to_string(),
        id: id.to_string(),
    }
}

/// Post a chirp as the current user
#[utoipa::path(
    post,
    path = "/api/chirps",
    request_body = ChirpCreate,
    tag = "chirps",
    responses(
        (status = 201, description = "Chirp created", body = ChirpResponse),
        (status = 400, description = "Chirp is too long"),
        (status = 401, description = "Missing or invalid session token"),
        (status = 404, description = "User no longer exists"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %abbrev_uuid(&current_user.id)))]
pub async fn create_chirp(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ChirpCreate>,
) -> Result<(StatusCode, Json<ChirpResponse>)> {
    if request.body.chars().count() > state.config.chirps.max_length {
        return Err(Error::BadRequest {
            message: "Chirp is too long".to_string(),
        });
    }

    // A session can outlive its user (e.g. after /admin/reset)
    let chirp = state
        .store
        .create_chirp(&ChirpCreateDBRequest {
            user_id: current_user.id,
            body: request.body,
        })
        .await
        .map_err(|e| match e {
            DbError::ForeignKeyViolation { .. } => Error::NotFound {
                resource: "User".to_string(),
                id: current_user.id.to_string(),
            },
            other => Error::from(other),
        })?;

    Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))))
}

/// List chirps, optionally by one author
#[utoipa::path(
    get,
    path = "/api/chirps",
    tag = "chirps",
    params(ListChirpsQuery),
    responses(
        (status = 200, description = "Chirps ordered by creation time", body = [ChirpResponse]),
        (status = 400, description = "Invalid author_id"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_chirps(State(state): State<AppState>, Query(query): Query<ListChirpsQuery>) -> Result<Json<Vec<ChirpResponse>>> {
    let author_id = query
        .author_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|_| Error::BadRequest {
            message: "Invalid author_id".to_string(),
        })?;

    let chirps = state
        .store
        .list_chirps(&ChirpFilter {
            author_id,
            sort: query.sort_direction(),
        })
        .await?;

    Ok(Json(chirps.into_iter().map(ChirpResponse::from).collect()))
}

/// Get a chirp by id
#[utoipa::path(
    get,
    path = "/api/chirps/{chirp_id}",
    tag = "chirps",
    params(
        ("chirp_id" = String, Path, description = "Chirp ID (UUID)"),
    ),
    responses(
        (status = 200, description = "The chirp", body = ChirpResponse),
        (status = 400, description = "Invalid chirp id"),
        (status = 404, description = "Chirp not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_chirp(State(state): State<AppState>, Path(chirp_id): Path<String>) -> Result<Json<ChirpResponse>> {
    let chirp_id = parse_chirp_id(&chirp_id)?;
    let chirp = state.store.get_chirp(chirp_id).await?.ok_or_else(|| chirp_not_found(chirp_id))?;

    Ok(Json(ChirpResponse::from(chirp)))
}

/// Delete one of the current user's chirps
///
/// The chirp is looked up before its owner is checked: a missing chirp is 404 for everyone, and
/// 403 only ever refers to a chirp that exists.
#[utoipa::path(
    delete,
    path = "/api/chirps/{chirp_id}",
    tag = "chirps",
    params(
        ("chirp_id" = String, Path, description = "Chirp ID (UUID)"),
    ),
    responses(
        (status = 204, description = "Chirp deleted"),
        (status = 400, description = "Invalid chirp id"),
        (status = 401, description = "Missing or invalid session token"),
        (status = 403, description = "Chirp belongs to another user"),
        (status = 404, description = "Chirp not found"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %abbrev_uuid(&current_user.id)))]
pub async fn delete_chirp(State(state): State<AppState>, current_user: CurrentUser, Path(chirp_id): Path<String>) -> Result<StatusCode> {
    let chirp_id = parse_chirp_id(&chirp_id)?;

    permissions::require_chirp_owner(&*state.store, chirp_id, current_user.id, Operation::DeleteOwn).await?;

    if !state.store.delete_chirp(chirp_id).await? {
        // Deleted concurrently between the ownership check and here
        return Err(chirp_not_found(chirp_id));
    }

    Ok(StatusCode::NO_CONTENT)
}
