//! Handlers for safety check-in sessions, SOS and the public share page.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use navmate_core::error::CoreError;
use navmate_core::notifier::AlertNotice;
use navmate_core::safety::{self, AlertKind};
use navmate_core::types::{DbId, Timestamp};
use navmate_core::validation::validate_message;
use navmate_db::models::safety::{CreateSosAlert, Heartbeat, SafetySession};
use navmate_db::repositories::safety_session_repo::{AckOutcome, EndOutcome, StartOutcome};
use navmate_db::repositories::{SafetyAlertRepo, SafetySessionRepo, TripPlanRepo};
use navmate_events::PlatformEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::alerts;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub plan_id: DbId,
    pub interval_min: i32,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: DbId,
    pub share_url: String,
    pub next_due: Timestamp,
    pub interval_minutes: i32,
}

#[derive(Debug, Deserialize)]
pub struct AckRequest {
    pub session_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub next_due: Timestamp,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: SafetySession,
    pub share_url: String,
    pub heartbeats: Vec<Heartbeat>,
}

#[derive(Debug, Deserialize)]
pub struct SosRequest {
    pub plan_id: DbId,
    pub location: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SosResponse {
    pub status: &'static str,
    pub alert_id: DbId,
    pub plan_id: DbId,
    pub timestamp: Timestamp,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LastHeartbeat {
    pub due_at: Timestamp,
    pub status: String,
    pub acked_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct PublicStatusResponse {
    pub plan_id: DbId,
    pub origin: String,
    pub destination: String,
    pub started_at: Timestamp,
    pub next_due: Timestamp,
    pub active: bool,
    pub interval_minutes: i32,
    pub last_heartbeat: Option<LastHeartbeat>,
}

fn share_url(state: &AppState, token: &str) -> String {
    safety::share_url(&state.config.public_base_url, token)
}

fn session_inactive(session: &SafetySession) -> AppError {
    tracing::debug!(session_id = session.id, "Rejected operation on ended session");
    AppError::Core(CoreError::InvalidState {
        entity: "SafetySession",
        current: "inactive".into(),
        message: "session inactive".into(),
    })
}

/// Trim an optional free-text field, dropping it when blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/safety/session
///
/// Start a check-in session on a plan. A plan with an active session answers
/// 409 with that session's id and share link.
pub async fn start(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<StartSessionRequest>,
) -> AppResult<Json<StartSessionResponse>> {
    let values = safety::start(input.interval_min, Utc::now())?;

    let outcome =
        SafetySessionRepo::start(&state.pool, input.plan_id, auth.user_id, &values).await?;

    match outcome {
        StartOutcome::Started { session, .. } => {
            tracing::info!(
                session_id = session.id,
                plan_id = session.plan_id,
                user_id = auth.user_id,
                interval_minutes = session.interval_minutes,
                "Safety session started",
            );
            state.event_bus.publish(
                PlatformEvent::new("safety.session_started")
                    .with_source("safety_session", session.id)
                    .with_actor(auth.user_id)
                    .with_payload(json!({ "plan_id": session.plan_id })),
            );

            Ok(Json(StartSessionResponse {
                session_id: session.id,
                share_url: share_url(&state, &session.share_token),
                next_due: session.next_due,
                interval_minutes: session.interval_minutes,
            }))
        }
        StartOutcome::Existing(existing) => Err(AppError::ConflictWith {
            message: "active session already exists".into(),
            details: json!({
                "session_id": existing.id,
                "share_url": share_url(&state, &existing.share_token),
            }),
        }),
        StartOutcome::PlanNotFound => Err(AppError::not_found("TripPlan", input.plan_id)),
        StartOutcome::PlanClosed(e) => Err(AppError::Core(e)),
    }
}

/// POST /v1/safety/heartbeat/ack
///
/// Acknowledge the current heartbeat and schedule the next one a full
/// interval after now.
pub async fn ack(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<AckRequest>,
) -> AppResult<Json<AckResponse>> {
    let outcome =
        SafetySessionRepo::acknowledge(&state.pool, input.session_id, auth.user_id, Utc::now())
            .await?;

    match outcome {
        AckOutcome::Acknowledged { session, acked, .. } => {
            tracing::info!(
                session_id = session.id,
                plan_id = session.plan_id,
                acked_heartbeat = acked.as_ref().map(|h| h.id),
                next_due = %session.next_due,
                "Heartbeat acknowledged",
            );
            Ok(Json(AckResponse {
                next_due: session.next_due,
                status: "acknowledged",
            }))
        }
        AckOutcome::Inactive(session) => Err(session_inactive(&session)),
        AckOutcome::NotFound => Err(AppError::not_found("SafetySession", input.session_id)),
    }
}

/// POST /v1/safety/session/{id}/end
pub async fn end(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<SafetySession>> {
    match SafetySessionRepo::end(&state.pool, session_id, auth.user_id, Utc::now()).await? {
        EndOutcome::Ended(session) => {
            tracing::info!(
                session_id = session.id,
                plan_id = session.plan_id,
                "Safety session ended",
            );
            state.event_bus.publish(
                PlatformEvent::new("safety.session_ended")
                    .with_source("safety_session", session.id)
                    .with_actor(auth.user_id)
                    .with_payload(json!({ "plan_id": session.plan_id })),
            );
            Ok(Json(session))
        }
        EndOutcome::Inactive(session) => Err(session_inactive(&session)),
        EndOutcome::NotFound => Err(AppError::not_found("SafetySession", session_id)),
    }
}

/// GET /v1/safety/session/{id}
pub async fn get_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<SessionDetail>> {
    let session = SafetySessionRepo::find_owned(&state.pool, session_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("SafetySession", session_id))?;
    let heartbeats = SafetySessionRepo::list_heartbeats(&state.pool, session.id).await?;

    Ok(Json(SessionDetail {
        share_url: share_url(&state, &session.share_token),
        session,
        heartbeats,
    }))
}

/// POST /v1/safety/sos
///
/// Record an SOS alert and notify the user's emergency contacts in the
/// background. The alert row exists before the response is sent; delivery
/// problems never fail the request.
pub async fn sos(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SosRequest>,
) -> AppResult<Json<SosResponse>> {
    validate_message(input.message.as_deref())?;

    let plan = TripPlanRepo::find_owned(&state.pool, input.plan_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("TripPlan", input.plan_id))?;
    let session = SafetySessionRepo::find_active_by_plan(&state.pool, plan.id).await?;

    let alert = SafetyAlertRepo::create_sos(
        &state.pool,
        &CreateSosAlert {
            plan_id: plan.id,
            session_id: session.as_ref().map(|s| s.id),
            location: non_blank(input.location),
            message: non_blank(input.message),
        },
    )
    .await?;

    tracing::warn!(
        alert_id = alert.id,
        plan_id = plan.id,
        user_id = auth.user_id,
        "SOS triggered",
    );

    // Contacts are best-effort too: an alert without recipients still
    // reaches the event bus and webhook.
    let recipients = alerts::recipients_for(&state.pool, auth.user_id)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(alert_id = alert.id, error = %e, "Failed to load emergency contacts");
            Vec::new()
        });

    let notice = AlertNotice {
        alert_id: alert.id,
        kind: AlertKind::Sos,
        user_id: auth.user_id,
        plan_id: plan.id,
        session_id: alert.session_id,
        origin: plan.origin,
        destination: plan.destination,
        location: alert.location.clone(),
        message: alert.message.clone(),
        occurred_at: alert.created_at,
        recipients,
    };
    alerts::spawn_dispatch(state.pool.clone(), state.notifier.clone(), notice);

    Ok(Json(SosResponse {
        status: "SOS triggered",
        alert_id: alert.id,
        plan_id: plan.id,
        timestamp: alert.created_at,
        message: "Emergency services and contacts will be notified",
    }))
}

/// GET /safety/s/{token}
///
/// Public share page. Unknown tokens and ended sessions are both 404.
pub async fn public_status(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<PublicStatusResponse>> {
    let status = SafetySessionRepo::public_status(&state.pool, &token)
        .await?
        .ok_or_else(|| AppError::NotFound("session not found or inactive".into()))?;

    let last_heartbeat = match (status.heartbeat_due_at, status.heartbeat_status) {
        (Some(due_at), Some(hb_status)) => Some(LastHeartbeat {
            due_at,
            status: hb_status,
            acked_at: status.heartbeat_acked_at,
        }),
        _ => None,
    };

    Ok(Json(PublicStatusResponse {
        plan_id: status.plan_id,
        origin: status.origin,
        destination: status.destination,
        started_at: status.started_at,
        next_due: status.next_due,
        active: status.active,
        interval_minutes: status.interval_minutes,
        last_heartbeat,
    }))
}
