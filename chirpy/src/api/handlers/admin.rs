use axum::{Json, extract::State};
use tracing::warn;

use crate::{
    AppState,
    api::models::admin::ResetResponse,
    config::Platform,
    errors::{Error, Result},
    types::Operation,
};

/// Delete every user (development only)
#[utoipa::path(
    post,
    path = "/admin/reset",
    tag = "admin",
    responses(
        (status = 200, description = "All users deleted", body = ResetResponse),
        (status = 403, description = "Not running with platform: dev"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn reset(State(state): State<AppState>) -> Result<Json<ResetResponse>> {
    if state.config.platform != Platform::Dev {
        return Err(Error::Forbidden {
            action: Operation::DeleteAll,
            resource: "users".to_string(),
        });
    }

    let deleted_users = state.store.delete_all_users().await?;
    warn!(deleted_users, "Reset deleted all users");

    Ok(Json(ResetResponse { deleted_users }))
}
