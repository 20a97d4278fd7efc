//! Handlers for Google sign-in.

use axum::extract::{Query, State};
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use navmate_core::error::CoreError;
use navmate_core::validation::normalize_email;
use navmate_db::models::user::{CreateUser, PROVIDER_GOOGLE};
use navmate_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::google::{self, GoogleAuthError};
use crate::auth::jwt::generate_access_token;
use crate::auth::password::unusable_password_hash;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GoogleLoginResponse {
    pub token: String,
    pub email: String,
    pub provider: String,
}

fn ensure_enabled(state: &AppState) -> AppResult<()> {
    if state.config.google.is_enabled() {
        Ok(())
    } else {
        Err(AppError::ServiceUnavailable(
            "Google sign-in is not configured".into(),
        ))
    }
}

/// GET /auth/google/login
///
/// Redirect to Google's consent page with a fresh state cookie.
pub async fn login(State(state): State<AppState>) -> AppResult<Response> {
    ensure_enabled(&state)?;

    let oauth_state = google::generate_state();
    let url = google::consent_url(&state.config.google, &oauth_state)
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok((
        StatusCode::FOUND,
        [
            (LOCATION, url.to_string()),
            (SET_COOKIE, google::state_cookie(&oauth_state)),
        ],
    )
        .into_response())
}

/// GET /auth/google/callback
///
/// Finish the flow: find or create the user and issue an access token.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Json<GoogleLoginResponse>> {
    ensure_enabled(&state)?;

    let cookie_state = google::state_from_cookies(&headers);
    match (&cookie_state, &query.state) {
        (Some(expected), Some(got)) if expected == got => {}
        _ => return Err(AppError::BadRequest("invalid oauth state".into())),
    }
    let code = query
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing code".into()))?;

    let profile = google::fetch_user(&state.http, &state.config.google, code)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Google sign-in failed");
            let message = match e {
                GoogleAuthError::MissingEmail => "get userinfo failed",
                _ => "code exchange failed",
            };
            AppError::Core(CoreError::Unauthorized(message.into()))
        })?;

    let email = normalize_email(&profile.email);
    let google_id = Some(profile.id.as_str()).filter(|id| !id.is_empty());

    let user = match UserRepo::find_by_email(&state.pool, &email).await? {
        Some(existing) => {
            let needs_link = existing.provider != PROVIDER_GOOGLE
                || (existing.google_id.is_none() && google_id.is_some());
            if needs_link {
                UserRepo::link_google(&state.pool, existing.id, google_id).await?
            } else {
                existing
            }
        }
        None => {
            let password_hash = unusable_password_hash()
                .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
            let user = UserRepo::create(
                &state.pool,
                &CreateUser {
                    email,
                    password_hash,
                    provider: PROVIDER_GOOGLE.to_string(),
                    google_id: google_id.map(str::to_string),
                },
            )
            .await?;
            tracing::info!(user_id = user.id, "User signed up with Google");
            user
        }
    };

    let token = generate_access_token(user.id, &user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(GoogleLoginResponse {
        token,
        email: user.email,
        provider: user.provider,
    }))
}
