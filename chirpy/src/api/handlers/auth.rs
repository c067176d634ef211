use axum::{Json, extract::State, http::StatusCode};
use tracing::{info, warn};

use crate::{
    AppState,
    api::models::{
        auth::{LoginResponse, RefreshResponse},
        users::{CredentialsRequest, UserResponse},
    },
    auth::{current_user::BearerToken, password},
    errors::{Error, Result},
    types::abbrev_uuid,
};

fn incorrect_credentials() -> Error {
    Error::Unauthenticated {
        message: Some("Incorrect email or password".to_string()),
    }
}

/// An unknown refresh token is reported to the caller as an authentication failure.
fn unknown_refresh_token(err: Error) -> Error {
    match err {
        Error::NotFound { .. } => Error::Unauthenticated {
            message: Some("Invalid refresh token".to_string()),
        },
        other => other,
    }
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = CredentialsRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Incorrect email or password"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<CredentialsRequest>) -> Result<Json<LoginResponse>> {
    let user = state
        .store
        .get_user_by_email(request.email.trim())
        .await?
        .ok_or_else(incorrect_credentials)?;

    // Verify on a blocking thread; any failure here is a failed login, never a crash
    let digest = user.hashed_password.clone();
    let password = request.password;
    let verified = match tokio::task::spawn_blocking(move || password::verify_password(&password, &digest)).await {
        Ok(Ok(verified)) => verified,
        Ok(Err(e)) => {
            warn!(user_id = %abbrev_uuid(&user.id), "Password verification failed: {}", e);
            false
        }
        Err(e) => {
            warn!(user_id = %abbrev_uuid(&user.id), "Password verification task failed: {}", e);
            false
        }
    };
    if !verified {
        return Err(incorrect_credentials());
    }

    let token = state.session_tokens().issue(user.id)?;
    let refresh_token = state.refresh_tokens().create(user.id).await?;

    info!(user_id = %abbrev_uuid(&user.id), "User logged in");
    Ok(Json(LoginResponse {
        user: UserResponse::from(user),
        token,
        refresh_token,
    }))
}

/// Exchange a refresh token for a new session token
///
/// The refresh token itself is not rotated and stays valid until it expires or is revoked.
#[utoipa::path(
    post,
    path = "/api/refresh",
    tag = "authentication",
    responses(
        (status = 200, description = "New session token", body = RefreshResponse),
        (status = 401, description = "Missing, unknown, expired or revoked refresh token"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn refresh(State(state): State<AppState>, BearerToken(refresh_token): BearerToken) -> Result<Json<RefreshResponse>> {
    let user_id = state
        .refresh_tokens()
        .authenticate(&refresh_token)
        .await
        .map_err(unknown_refresh_token)?;

    let token = state.session_tokens().issue(user_id)?;
    Ok(Json(RefreshResponse { token }))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/api/revoke",
    tag = "authentication",
    responses(
        (status = 204, description = "Refresh token revoked"),
        (status = 401, description = "Missing or unknown refresh token"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn revoke(State(state): State<AppState>, BearerToken(refresh_token): BearerToken) -> Result<StatusCode> {
    state
        .refresh_tokens()
        .revoke(&refresh_token)
        .await
        .map_err(unknown_refresh_token)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::refresh_tokens::generate_refresh_token, db::models::users::UserCreateDBRequest, test_utils::*};
    use chrono::Duration;
    use serde_json::json;
    use std::sync::Arc;

    #[test_log::test(tokio::test)]
    async fn test_login_returns_tokens() {
        let (server, state, _) = create_test_server(create_test_config());
        let user = register_user(&server, "login@example.com").await;

        let login = login_user(&server, "login@example.com").await;
        assert_eq!(login.user.id, user.id);
        assert_eq!(login.user.email, "login@example.com");
        assert_eq!(state.session_tokens().validate(&login.token).unwrap(), user.id);
        assert_eq!(state.refresh_tokens().authenticate(&login.refresh_token).await.unwrap(), user.id);
    }

    #[test_log::test(tokio::test)]
    async fn test_login_response_is_flat() {
        let (server, _, _) = create_test_server(create_test_config());
        register_user(&server, "flat@example.com").await;

        let response = server
            .post("/api/login")
            .json(&json!({ "email": "flat@example.com", "password": TEST_PASSWORD }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        for field in ["id", "created_at", "updated_at", "email", "is_chirpy_red", "token", "refresh_token"] {
            assert!(body.get(field).is_some(), "missing {field}");
        }
        assert!(body.get("user").is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_login_failures_are_indistinguishable() {
        let (server, _, _) = create_test_server(create_test_config());
        register_user(&server, "exists@example.com").await;

        for (email, password) in [("exists@example.com", "wrong-password"), ("nobody@example.com", TEST_PASSWORD)] {
            let response = server
                .post("/api/login")
                .json(&json!({ "email": email, "password": password }))
                .await;
            response.assert_status_unauthorized();
            response.assert_json(&json!({ "error": "Incorrect email or password" }));
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_login_with_corrupt_digest_is_unauthorized() {
        let (server, state, _) = create_test_server(create_test_config());
        state
            .store
            .create_user(&UserCreateDBRequest {
                email: "corrupt@example.com".to_string(),
                hashed_password: "plaintext-password".to_string(),
            })
            .await
            .unwrap();

        let response = server
            .post("/api/login")
            .json(&json!({ "email": "corrupt@example.com", "password": "plaintext-password" }))
            .await;
        response.assert_status_unauthorized();
    }

    #[test_log::test(tokio::test)]
    async fn test_refresh_issues_new_session_token() {
        let (server, state, clock) = create_test_server(create_test_config());
        let user = register_user(&server, "refresh@example.com").await;
        let login = login_user(&server, "refresh@example.com").await;

        // Past the session lifetime but well within the refresh lifetime
        clock.advance(Duration::hours(2));
        assert!(matches!(state.session_tokens().validate(&login.token), Err(Error::ExpiredToken)));

        let (name, value) = bearer(&login.refresh_token);
        let response = server.post("/api/refresh").add_header(name, value).await;
        response.assert_status_ok();
        let refreshed: RefreshResponse = response.json();
        assert_eq!(state.session_tokens().validate(&refreshed.token).unwrap(), user.id);

        // Not rotated: the same refresh token keeps working
        let (name, value) = bearer(&login.refresh_token);
        server.post("/api/refresh").add_header(name, value).await.assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_refresh_rejections() {
        let (server, _, clock) = create_test_server(create_test_config());
        register_user(&server, "rejected@example.com").await;
        let login = login_user(&server, "rejected@example.com").await;

        server.post("/api/refresh").await.assert_status_unauthorized();

        let (name, value) = bearer(&generate_refresh_token());
        let response = server.post("/api/refresh").add_header(name, value).await;
        response.assert_status_unauthorized();
        response.assert_json(&json!({ "error": "Invalid refresh token" }));

        clock.advance(Duration::days(60));
        let (name, value) = bearer(&login.refresh_token);
        let response = server.post("/api/refresh").add_header(name, value).await;
        response.assert_status_unauthorized();
        response.assert_json(&json!({ "error": "Token has expired" }));
    }

    #[test_log::test(tokio::test)]
    async fn test_revoke_then_refresh_fails() {
        let (server, _, _) = create_test_server(create_test_config());
        register_user(&server, "revoke@example.com").await;
        let login = login_user(&server, "revoke@example.com").await;

        let (name, value) = bearer(&login.refresh_token);
        server
            .post("/api/revoke")
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let (name, value) = bearer(&login.refresh_token);
        let response = server.post("/api/refresh").add_header(name, value).await;
        response.assert_status_unauthorized();
        response.assert_json(&json!({ "error": "Token has been revoked" }));

        // Revoking again is harmless
        let (name, value) = bearer(&login.refresh_token);
        server
            .post("/api/revoke")
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[test_log::test(tokio::test)]
    async fn test_revoke_unknown_token() {
        let (server, _, _) = create_test_server(create_test_config());

        let (name, value) = bearer("never-issued");
        server.post("/api/revoke").add_header(name, value).await.assert_status_unauthorized();
    }

    #[test_log::test(tokio::test)]
    async fn test_store_outage_is_service_unavailable() {
        let (server, _, _) = create_test_server_with_store(create_test_config(), Arc::new(UnavailableStore));

        let response = server
            .post("/api/login")
            .json(&json!({ "email": "anyone@example.com", "password": TEST_PASSWORD }))
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        response.assert_json(&json!({ "error": "Service temporarily unavailable" }));

        for path in ["/api/refresh", "/api/revoke"] {
            let (name, value) = bearer(&generate_refresh_token());
            let response = server.post(path).add_header(name, value).await;
            response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        }
    }
}
