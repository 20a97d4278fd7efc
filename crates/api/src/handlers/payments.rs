//! Handlers for payment authorization, capture, refund and the provider
//! webhook.
//!
//! Payments follow `authorized -> captured -> refunded`; `declined` is
//! terminal. Every transition is a conditional update on the expected
//! current status, so a concurrent capture or refund can succeed only once.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use navmate_core::error::CoreError;
use navmate_core::payment::{validate_amount, validate_transition, PaymentStatus};
use navmate_core::types::DbId;
use navmate_db::models::payment::{CreatePayment, Payment};
use navmate_db::repositories::{PaymentRepo, RideBookingRepo};
use navmate_events::PlatformEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::signature::{self, SIGNATURE_HEADER};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    pub booking_id: DbId,
    pub amount_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub payment_id: DbId,
    pub status: String,
    pub external_ref: String,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub payment_id: DbId,
    pub status: String,
}

/// Body posted by the payment provider.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub external_ref: Option<String>,
}

/// Target status for a webhook event type, if the type is one we act on.
fn webhook_target(event_type: &str) -> Option<PaymentStatus> {
    match event_type {
        "payment.captured" => Some(PaymentStatus::Captured),
        "payment.refunded" => Some(PaymentStatus::Refunded),
        _ => None,
    }
}

fn already_paid(existing: &Payment) -> AppError {
    AppError::ConflictWith {
        message: "booking already has a payment".into(),
        details: json!({
            "payment_id": existing.id,
            "status": existing.status,
        }),
    }
}

fn payment_event(payment: &Payment, actor: Option<DbId>) -> PlatformEvent {
    let event = PlatformEvent::new(format!("payment.{}", payment.status))
        .with_source("payment", payment.id)
        .with_payload(json!({
            "amount_cents": payment.amount_cents,
            "currency": payment.currency,
            "external_ref": payment.external_ref,
        }));
    match actor {
        Some(user_id) => event.with_actor(user_id),
        None => event,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/payments/authorize
///
/// Authorize an amount for a booking and link the payment to it. A declined
/// authorization is still recorded and linked, and answers 402.
///
/// The provider is called while the booking row is locked, so every
/// authorization it issues ends up stored.
pub async fn authorize(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<AuthorizeRequest>,
) -> AppResult<Response> {
    validate_amount(input.amount_cents)?;

    let booking = RideBookingRepo::find_owned(&state.pool, input.booking_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("RideBooking", input.booking_id))?;

    let lock = PaymentRepo::lock_booking(&state.pool, booking.id)
        .await?
        .ok_or_else(|| AppError::not_found("RideBooking", booking.id))?;
    if let Some(existing) = lock.live_payment() {
        return Err(already_paid(existing));
    }

    let authorization = state.payments.authorize(input.amount_cents).await;

    let payment = lock
        .record(&CreatePayment {
            amount_cents: input.amount_cents,
            currency: state.config.payment_currency.clone(),
            status: authorization.status.as_str().to_string(),
            external_ref: authorization.external_ref,
        })
        .await?;

    tracing::info!(
        payment_id = payment.id,
        booking_id = booking.id,
        status = %payment.status,
        "Payment authorization recorded",
    );
    state
        .event_bus
        .publish(payment_event(&payment, Some(auth.user_id)));

    if authorization.status == PaymentStatus::Declined {
        let body = json!({
            "error": "payment declined",
            "code": "PAYMENT_DECLINED",
            "payment_id": payment.id,
            "status": payment.status,
        });
        return Ok((StatusCode::PAYMENT_REQUIRED, Json(body)).into_response());
    }

    Ok(Json(AuthorizeResponse {
        payment_id: payment.id,
        status: payment.status,
        external_ref: payment.external_ref,
    })
    .into_response())
}

/// Apply `to` to a payment the caller owns.
async fn transition_owned(
    state: &AppState,
    user_id: DbId,
    payment_id: DbId,
    to: PaymentStatus,
) -> AppResult<Json<TransitionResponse>> {
    let payment = PaymentRepo::find_owned(&state.pool, payment_id, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Payment", payment_id))?;
    validate_transition(&payment.status, to)?;
    let from: PaymentStatus = payment.status.parse()?;

    let Some(updated) = PaymentRepo::transition(&state.pool, payment.id, from, to).await? else {
        // Lost a race with another transition; report the state that won.
        let current = PaymentRepo::find_by_id(&state.pool, payment.id)
            .await?
            .ok_or_else(|| AppError::not_found("Payment", payment.id))?;
        validate_transition(&current.status, to)?;
        return Err(AppError::Core(CoreError::Conflict(
            "payment changed concurrently".into(),
        )));
    };

    tracing::info!(payment_id = updated.id, status = %updated.status, "Payment transitioned");
    state.event_bus.publish(payment_event(&updated, Some(user_id)));

    Ok(Json(TransitionResponse {
        payment_id: updated.id,
        status: updated.status,
    }))
}

/// POST /v1/payments/{id}/capture
pub async fn capture(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(payment_id): Path<DbId>,
) -> AppResult<Json<TransitionResponse>> {
    transition_owned(&state, auth.user_id, payment_id, PaymentStatus::Captured).await
}

/// POST /v1/payments/{id}/refund
pub async fn refund(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(payment_id): Path<DbId>,
) -> AppResult<Json<TransitionResponse>> {
    transition_owned(&state, auth.user_id, payment_id, PaymentStatus::Refunded).await
}

/// GET /v1/payments/{id}
pub async fn get(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(payment_id): Path<DbId>,
) -> AppResult<Json<Payment>> {
    let payment = PaymentRepo::find_owned(&state.pool, payment_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Payment", payment_id))?;
    Ok(Json(payment))
}

/// POST /v1/payments/webhook
///
/// Public endpoint for the payment provider. When a webhook secret is
/// configured the raw body must carry a valid `X-Signature`. Deliveries for
/// unknown references, unknown types or already-applied transitions are
/// acknowledged without effect so the provider stops retrying.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    if let Some(secret) = state.config.payment_webhook_secret.as_deref() {
        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !signature::verify(secret, &body, provided) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "invalid webhook signature".into(),
            )));
        }
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("invalid payload".into()))?;

    let received = Json(json!({ "received": true }));

    let Some(to) = webhook_target(&payload.event_type) else {
        tracing::debug!(event_type = %payload.event_type, "Ignoring payment webhook");
        return Ok(received);
    };
    let Some(external_ref) = payload.external_ref.as_deref().filter(|r| !r.is_empty()) else {
        return Err(AppError::BadRequest("external_ref is required".into()));
    };

    let Some(payment) = PaymentRepo::find_by_external_ref(&state.pool, external_ref).await?
    else {
        tracing::warn!(external_ref, "Payment webhook for unknown reference");
        return Ok(received);
    };

    if let Err(e) = validate_transition(&payment.status, to) {
        tracing::info!(payment_id = payment.id, error = %e, "Payment webhook not applied");
        return Ok(received);
    }
    let from: PaymentStatus = payment.status.parse()?;

    match PaymentRepo::transition(&state.pool, payment.id, from, to).await? {
        Some(updated) => {
            tracing::info!(
                payment_id = updated.id,
                status = %updated.status,
                "Payment transitioned by webhook",
            );
            state.event_bus.publish(payment_event(&updated, None));
        }
        None => {
            tracing::info!(payment_id = payment.id, "Payment webhook lost a concurrent update");
        }
    }

    Ok(received)
}
