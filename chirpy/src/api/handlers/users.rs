use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::{
        handlers::hash_password_blocking,
        models::users::{CredentialsRequest, UserResponse},
    },
    auth::current_user::CurrentUser,
    config::PasswordConfig,
    db::models::users::{UserCreateDBRequest, UserCredentialsUpdateDBRequest},
    errors::{Error, Result},
    types::abbrev_uuid,
};

/// Check an email/password pair against the configured rules.
fn validate_credentials(request: &CredentialsRequest, rules: &PasswordConfig) -> Result<()> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::BadRequest {
            message: "A valid email address is required".to_string(),
        });
    }

    let password_length = request.password.chars().count();
    if password_length < rules.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", rules.min_length),
        });
    }
    if password_length > rules.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", rules.max_length),
        });
    }

    Ok(())
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CredentialsRequest,
    tag = "users",
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "An account with this email address already exists"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(State(state): State<AppState>, Json(request): Json<CredentialsRequest>) -> Result<(StatusCode, Json<UserResponse>)> {
    let rules = &state.config.auth.password;
    validate_credentials(&request, rules)?;

    let hashed_password = hash_password_blocking(request.password, rules.argon2_params()).await?;
    let user = state
        .store
        .create_user(&UserCreateDBRequest {
            email: request.email.trim().to_string(),
            hashed_password,
        })
        .await?;

    tracing::info!(user_id = %abbrev_uuid(&user.id), "Registered user");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Replace the caller's email and password
#[utoipa::path(
    put,
    path = "/api/users",
    request_body = CredentialsRequest,
    tag = "users",
    responses(
        (status = 200, description = "Credentials updated", body = UserResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 401, description = "Missing or invalid session token"),
        (status = 409, description = "Email address is taken by another account"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %abbrev_uuid(&current_user.id)))]
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<UserResponse>> {
    let rules = &state.config.auth.password;
    validate_credentials(&request, rules)?;

    let hashed_password = hash_password_blocking(request.password, rules.argon2_params()).await?;
    let user = state
        .store
        .update_user_credentials(
            current_user.id,
            &UserCredentialsUpdateDBRequest {
                email: request.email.trim().to_string(),
                hashed_password,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}
