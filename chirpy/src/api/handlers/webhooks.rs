use axum::{Json, extract::State, http::StatusCode};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    AppState,
    api::models::webhooks::{PolkaWebhook, USER_UPGRADED_EVENT},
    auth::current_user::WebhookCaller,
    db::errors::DbError,
    errors::{Error, Result},
    types::abbrev_uuid,
};

/// Receive a payment provider event
///
/// Only `user.upgraded` changes state; every other event is acknowledged and ignored so the
/// provider does not retry it.
#[utoipa::path(
    post,
    path = "/api/polka/webhooks",
    request_body = PolkaWebhook,
    tag = "webhooks",
    responses(
        (status = 204, description = "Event accepted"),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "User not found"),
    ),
    security(("api_key" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn polka_webhook(State(state): State<AppState>, _caller: WebhookCaller, Json(event): Json<PolkaWebhook>) -> Result<StatusCode> {
    if event.event != USER_UPGRADED_EVENT {
        debug!(event = %event.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = Uuid::parse_str(&event.data.user_id).map_err(|_| Error::BadRequest {
        message: "Invalid user_id".to_string(),
    })?;

    state.store.mark_user_upgraded(user_id).await.map_err(|e| match e {
        DbError::NotFound => Error::NotFound {
            resource: "User".to_string(),
            id: user_id.to_string(),
        },
        other => Error::from(other),
    })?;

    info!(user_id = %abbrev_uuid(&user_id), "User upgraded to Chirpy Red");
    Ok(StatusCode::NO_CONTENT)
}
