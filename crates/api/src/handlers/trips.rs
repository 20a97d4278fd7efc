//! Handlers for trip planning and itinerary selection.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use navmate_core::providers::estimate_or_fallback;
use navmate_core::trip::{validate_place, validate_selection};
use navmate_core::types::{DbId, Timestamp};
use navmate_db::models::trip::{CreateTripPlan, Itinerary, Leg, TripPlan};
use navmate_db::repositories::{ItineraryRepo, TripPlanRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub origin: String,
    pub destination: String,
    /// RFC 3339; ignored when it does not parse.
    pub depart_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlanOption {
    pub itinerary_id: DbId,
    pub mode_mix: String,
    pub total_minutes: i32,
    pub rough_cost_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan_id: DbId,
    pub options: Vec<PlanOption>,
}

#[derive(Debug, Serialize)]
pub struct ItineraryWithLegs {
    #[serde(flatten)]
    pub itinerary: Itinerary,
    pub legs: Vec<Leg>,
}

#[derive(Debug, Serialize)]
pub struct PlanDetail {
    #[serde(flatten)]
    pub plan: TripPlan,
    pub itinerary_count: usize,
    pub itineraries: Vec<ItineraryWithLegs>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub itinerary_id: DbId,
}

fn parse_depart_at(raw: Option<&str>) -> Option<Timestamp> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/trips/plan
///
/// Estimate route options and persist them as a new plan.
pub async fn plan(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<PlanRequest>,
) -> AppResult<Json<PlanResponse>> {
    validate_place("origin", &input.origin)?;
    validate_place("destination", &input.destination)?;

    let origin = input.origin.trim().to_string();
    let destination = input.destination.trim().to_string();
    let depart_at = parse_depart_at(input.depart_at.as_deref());

    let options =
        estimate_or_fallback(state.itineraries.as_ref(), &origin, &destination, depart_at).await;

    let (plan, itineraries) = TripPlanRepo::create_with_options(
        &state.pool,
        &CreateTripPlan {
            user_id: auth.user_id,
            origin,
            destination,
            depart_at,
        },
        &options,
    )
    .await?;

    tracing::info!(
        plan_id = plan.id,
        user_id = auth.user_id,
        options = itineraries.len(),
        "Trip planned",
    );

    Ok(Json(PlanResponse {
        plan_id: plan.id,
        options: itineraries
            .into_iter()
            .map(|it| PlanOption {
                itinerary_id: it.id,
                mode_mix: it.mode_mix,
                total_minutes: it.total_minutes,
                rough_cost_cents: it.rough_cost_cents,
            })
            .collect(),
    }))
}

/// GET /v1/trips/plans/{id}
pub async fn get_plan(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(plan_id): Path<DbId>,
) -> AppResult<Json<PlanDetail>> {
    let plan = TripPlanRepo::find_owned(&state.pool, plan_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("TripPlan", plan_id))?;

    let itineraries = ItineraryRepo::list_by_plan(&state.pool, plan.id).await?;
    let legs = ItineraryRepo::list_legs_for_plan(&state.pool, plan.id).await?;

    let itineraries: Vec<ItineraryWithLegs> = itineraries
        .into_iter()
        .map(|itinerary| ItineraryWithLegs {
            legs: legs
                .iter()
                .filter(|l| l.itinerary_id == itinerary.id)
                .cloned()
                .collect(),
            itinerary,
        })
        .collect();

    Ok(Json(PlanDetail {
        plan,
        itinerary_count: itineraries.len(),
        itineraries,
    }))
}

/// POST /v1/trips/plans/{id}/select
///
/// Choose one of the plan's itineraries. Allowed until a safety session
/// starts on the plan.
pub async fn select(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(plan_id): Path<DbId>,
    Json(input): Json<SelectRequest>,
) -> AppResult<StatusCode> {
    let plan = TripPlanRepo::find_owned(&state.pool, plan_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("TripPlan", plan_id))?;
    validate_selection(&plan.status)?;

    ItineraryRepo::find_in_plan(&state.pool, input.itinerary_id, plan.id)
        .await?
        .ok_or_else(|| AppError::BadRequest("itinerary does not belong to plan".into()))?;

    if TripPlanRepo::select_itinerary(&state.pool, plan.id, input.itinerary_id)
        .await?
        .is_none()
    {
        // The plan moved on between the read and the guarded update.
        let current = TripPlanRepo::find_owned(&state.pool, plan.id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("TripPlan", plan.id))?;
        validate_selection(&current.status)?;
        return Err(AppError::InternalError(format!(
            "selection of plan {} was not applied",
            plan.id
        )));
    }

    tracing::info!(
        plan_id = plan.id,
        itinerary_id = input.itinerary_id,
        "Itinerary selected",
    );

    Ok(StatusCode::NO_CONTENT)
}
