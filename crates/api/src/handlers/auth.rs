//! Handlers for local sign-up, login and the current-user endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use navmate_core::error::CoreError;
use navmate_core::types::DbId;
use navmate_core::validation::{normalize_email, validate_email, validate_password_strength};
use navmate_db::models::user::{CreateUser, PROVIDER_LOCAL};
use navmate_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/auth/signup` and `POST /v1/auth/login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: DbId,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: DbId,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/auth/signup
///
/// Register a local account. The email is stored lowercase.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    validate_password_strength(&input.password)?;

    if UserRepo::email_exists(&state.pool, &email).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "email already registered".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // A concurrent sign-up still trips uq_users_email and maps to 409.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash,
            provider: PROVIDER_LOCAL.to_string(),
            google_id: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user.id,
            email: user.email,
        }),
    ))
}

/// POST /v1/auth/login
///
/// Exchange email + password for an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<Json<TokenResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("invalid credentials".into()));

    let email = normalize_email(&input.email);
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    let token = generate_access_token(user.id, &user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse { token }))
}

/// GET /v1/me
pub async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: auth.user_id,
        email: auth.email,
    })
}
