//! End-to-end flows through the full router.

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use crate::{
    api::models::{auth::RefreshResponse, chirps::ChirpResponse},
    config::Platform,
    test_utils::*,
};

/// A user's whole journey: register, log in, post, let the session lapse, refresh, log out.
#[test_log::test(tokio::test)]
async fn test_session_lifecycle() {
    let (server, _, clock) = create_test_server(create_test_config());
    let user = register_user(&server, "saul@bettercall.com").await;
    let login = login_user(&server, "saul@bettercall.com").await;

    let (name, value) = bearer(&login.token);
    let response = server
        .post("/api/chirps")
        .add_header(name, value)
        .json(&json!({ "body": "Did you know that you have rights?" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let chirp: ChirpResponse = response.json();
    assert_eq!(chirp.user_id, user.id);

    // Within leeway the session still works
    clock.advance(Duration::hours(1) + Duration::seconds(5));
    let (name, value) = bearer(&login.token);
    server
        .post("/api/chirps")
        .add_header(name, value)
        .json(&json!({ "body": "still here" }))
        .await
        .assert_status(StatusCode::CREATED);

    // Past it, the session is rejected as expired
    clock.advance(Duration::seconds(1));
    let (name, value) = bearer(&login.token);
    let response = server
        .post("/api/chirps")
        .add_header(name, value)
        .json(&json!({ "body": "too late" }))
        .await;
    response.assert_status_unauthorized();
    response.assert_json(&json!({ "error": "Token has expired" }));

    // The refresh token yields a working session
    let (name, value) = bearer(&login.refresh_token);
    let refreshed: RefreshResponse = server.post("/api/refresh").add_header(name, value).await.json();
    let (name, value) = bearer(&refreshed.token);
    server
        .post("/api/chirps")
        .add_header(name, value)
        .json(&json!({ "body": "back again" }))
        .await
        .assert_status(StatusCode::CREATED);

    // Logging out revokes the refresh token but not sessions already derived from it
    let (name, value) = bearer(&login.refresh_token);
    server
        .post("/api/revoke")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let (name, value) = bearer(&login.refresh_token);
    server.post("/api/refresh").add_header(name, value).await.assert_status_unauthorized();
    let (name, value) = bearer(&refreshed.token);
    server
        .post("/api/chirps")
        .add_header(name, value)
        .json(&json!({ "body": "one last chirp" }))
        .await
        .assert_status(StatusCode::CREATED);

    let chirps: Vec<ChirpResponse> = server.get("/api/chirps").await.json();
    assert_eq!(chirps.len(), 4);
}

/// Sessions from one device survive revoking another device's refresh token.
#[test_log::test(tokio::test)]
async fn test_devices_are_independent() {
    let (server, _, _) = create_test_server(create_test_config());
    register_user(&server, "multi@example.com").await;
    let laptop = login_user(&server, "multi@example.com").await;
    let phone = login_user(&server, "multi@example.com").await;
    assert_ne!(laptop.refresh_token, phone.refresh_token);

    let (name, value) = bearer(&laptop.refresh_token);
    server
        .post("/api/revoke")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let (name, value) = bearer(&phone.refresh_token);
    server.post("/api/refresh").add_header(name, value).await.assert_status_ok();
}

/// A token signed with another key is rejected even though it is well formed.
#[test_log::test(tokio::test)]
async fn test_foreign_signing_key_is_rejected() {
    let (server, _, _) = create_test_server(create_test_config());
    let user = register_user(&server, "target@example.com").await;

    let mut other = create_test_config();
    other.secret_key = Some("a-completely-different-secret".to_string());
    let (_, foreign_state, _) = create_test_server(other);
    let forged = foreign_state.session_tokens().issue(user.id).unwrap();

    let (name, value) = bearer(&forged);
    let response = server
        .post("/api/chirps")
        .add_header(name, value)
        .json(&json!({ "body": "forged" }))
        .await;
    response.assert_status_unauthorized();
    response.assert_json(&json!({ "error": "Invalid token" }));
}

/// Credential header shapes seen at the boundary.
#[test_log::test(tokio::test)]
async fn test_malformed_authorization_headers() {
    let (server, _, _) = create_test_server(create_test_config());

    for header in ["Basic xyz", "Bearer a b", "bearer token", "Bearer"] {
        let response = server
            .post("/api/chirps")
            .add_header("authorization", header)
            .json(&json!({ "body": "hi" }))
            .await;
        response.assert_status_unauthorized();
        response.assert_json(&json!({ "error": "Malformed authorization header" }));
    }
}

/// Ownership: A cannot delete B's chirp, B can, and afterwards nobody can see it.
#[test_log::test(tokio::test)]
async fn test_ownership_gate() {
    let (server, _, _) = create_test_server(create_test_config());
    register_user(&server, "a@example.com").await;
    register_user(&server, "b@example.com").await;
    let a = login_user(&server, "a@example.com").await.token;
    let b = login_user(&server, "b@example.com").await.token;

    let (name, value) = bearer(&b);
    let chirp: ChirpResponse = server
        .post("/api/chirps")
        .add_header(name, value)
        .json(&json!({ "body": "b's chirp" }))
        .await
        .json();
    let path = format!("/api/chirps/{}", chirp.id);

    let (name, value) = bearer(&a);
    server.delete(&path).add_header(name, value).await.assert_status_forbidden();

    let (name, value) = bearer(&b);
    server
        .delete(&path)
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server.get(&path).await.assert_status_not_found();
    let (name, value) = bearer(&a);
    server.delete(&path).add_header(name, value).await.assert_status_not_found();
}

/// Reset wipes everything in dev, after which previously issued sessions no longer resolve to a user.
#[test_log::test(tokio::test)]
async fn test_reset_then_reuse_email() {
    let mut config = create_test_config();
    config.platform = Platform::Dev;
    let (server, _, _) = create_test_server(config);

    register_user(&server, "again@example.com").await;
    let login = login_user(&server, "again@example.com").await;
    server.post("/admin/reset").await.assert_status_ok();

    // The session token still verifies but its user is gone
    let (name, value) = bearer(&login.token);
    server
        .put("/api/users")
        .add_header(name, value)
        .json(&json!({ "email": "again@example.com", "password": TEST_PASSWORD }))
        .await
        .assert_status_not_found();

    let (name, value) = bearer(&login.token);
    let response = server
        .post("/api/chirps")
        .add_header(name, value)
        .json(&json!({ "body": "posthumous" }))
        .await;
    response.assert_status_not_found();
    assert!(server.get("/api/chirps").await.json::<Vec<ChirpResponse>>().is_empty());

    register_user(&server, "again@example.com").await;
}
