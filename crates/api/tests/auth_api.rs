//! HTTP-level integration tests for sign-up, login and the current-user
//! endpoint.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, signup_and_login, TEST_PASSWORD};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_returns_201_with_normalized_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/v1/auth/signup",
        serde_json::json!({ "email": "  Traveller@Example.COM ", "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["id"].is_number());
    assert_eq!(json["email"], "traveller@example.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_duplicate_email_returns_409(pool: PgPool) {
    let app = common::build_test_app(pool);
    signup_and_login(&app, "dup@example.com").await;

    let response = post_json(
        app,
        "/v1/auth/signup",
        serde_json::json!({ "email": "DUP@example.com", "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_rejects_bad_input(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/v1/auth/signup",
        serde_json::json!({ "email": "not-an-email", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app,
        "/v1/auth/signup",
        serde_json::json!({ "email": "short@example.com", "password": "abc" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    signup_and_login(&app, "rider@example.com").await;

    let response = post_json(
        app,
        "/v1/auth/login",
        serde_json::json!({ "email": "rider@example.com", "password": "wrong-password" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid credentials");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_unknown_email_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/v1/auth/login",
        serde_json::json!({ "email": "ghost@example.com", "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_returns_token_identity(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup_and_login(&app, "me@example.com").await;

    let response = get_auth(app, "/v1/me", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["email"], "me@example.com");
    assert!(json["user_id"].is_number());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_protected_route_requires_bearer_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/v1/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/v1/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_google_login_unconfigured_returns_503(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/auth/google/login").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_google_login_redirects_with_state_cookie(pool: PgPool) {
    let mut config = common::test_config();
    config.google.client_id = "client-123".into();
    config.google.client_secret = "secret".into();
    config.google.redirect_url = "http://localhost:8080/auth/google/callback".into();
    let app = common::build_test_app_with(
        pool,
        config,
        std::sync::Arc::new(navmate_providers::FixedPaymentProvider::authorizing()),
    )
    .router;

    let response = get(app.clone(), "/auth/google/login").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers()["location"].to_str().unwrap();
    assert!(location.starts_with("https://accounts.google.com/"));
    assert!(location.contains("client_id=client-123"));
    let cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(cookie.starts_with("oauthstate="));

    // A callback without the matching cookie is rejected before any
    // outbound request is made.
    let response = get(app, "/auth/google/callback?state=forged&code=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
