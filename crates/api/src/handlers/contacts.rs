//! Handlers for the caller's emergency contacts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use navmate_core::error::CoreError;
use navmate_core::types::DbId;
use navmate_core::validation::{normalize_email, validate_email, validate_required};
use navmate_db::models::contact::{CreateEmergencyContact, EmergencyContact};
use navmate_db::repositories::EmergencyContactRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /v1/me/contacts
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<EmergencyContact>>> {
    let contacts = EmergencyContactRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(contacts))
}

/// POST /v1/me/contacts
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateEmergencyContact>,
) -> AppResult<(StatusCode, Json<EmergencyContact>)> {
    validate_required("name", &input.name)?;
    validate_required("phone", &input.phone)?;

    input.email = input
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|e| !e.is_empty());
    if let Some(email) = input.email.as_deref() {
        validate_email(email)?;
    }
    if input.priority.is_some_and(|p| p < 1) {
        return Err(AppError::Core(CoreError::Validation(
            "priority must be at least 1".into(),
        )));
    }

    let contact = EmergencyContactRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(contact_id = contact.id, user_id = auth.user_id, "Emergency contact added");

    Ok((StatusCode::CREATED, Json(contact)))
}

/// DELETE /v1/me/contacts/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contact_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !EmergencyContactRepo::delete_owned(&state.pool, contact_id, auth.user_id).await? {
        return Err(AppError::not_found("EmergencyContact", contact_id));
    }
    Ok(StatusCode::NO_CONTENT)
}
