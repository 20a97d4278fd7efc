//! Handlers for ride bookings on a selected itinerary.

use axum::extract::{Path, State};
use axum::Json;
use navmate_core::error::CoreError;
use navmate_core::trip::first_ride_leg;
use navmate_core::types::DbId;
use navmate_db::models::booking::{CreateRideBooking, RideBooking};
use navmate_db::repositories::{ItineraryRepo, RideBookingRepo, TripPlanRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub plan_id: DbId,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CreateBookingResponse {
    Booked {
        booking_id: DbId,
        status: String,
        eta_minutes: i32,
        fare_cents: i64,
    },
    /// The selected itinerary has no bookable ride leg.
    NothingToBook {
        message: &'static str,
        plan_id: DbId,
        itinerary_id: DbId,
    },
}

/// POST /v1/bookings
///
/// Book the first ride leg of the plan's selected itinerary at the
/// itinerary's rough cost. The provider's outcome is stored as the booking
/// status, including `surge_too_high` and `failed`.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBookingRequest>,
) -> AppResult<Json<CreateBookingResponse>> {
    let plan = TripPlanRepo::find_owned(&state.pool, input.plan_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("TripPlan", input.plan_id))?;

    let itinerary_id = plan.selected_itinerary_id.ok_or_else(|| {
        AppError::Core(CoreError::InvalidState {
            entity: "TripPlan",
            current: plan.status.clone(),
            message: "plan not selected".into(),
        })
    })?;
    let itinerary = ItineraryRepo::find_in_plan(&state.pool, itinerary_id, plan.id)
        .await?
        .ok_or_else(|| AppError::BadRequest("itinerary missing".into()))?;

    let legs = ItineraryRepo::list_legs(&state.pool, itinerary.id).await?;
    let ride = first_ride_leg(legs.iter().map(|l| (l.mode.as_str(), l.provider.as_deref())));
    let Some((position, provider)) = ride else {
        return Ok(Json(CreateBookingResponse::NothingToBook {
            message: "no ride legs; nothing to book",
            plan_id: plan.id,
            itinerary_id: itinerary.id,
        }));
    };

    let outcome = state.rides.book(provider, itinerary.rough_cost_cents).await;

    let booking = RideBookingRepo::create(
        &state.pool,
        &CreateRideBooking {
            plan_id: plan.id,
            itinerary_id: itinerary.id,
            leg_id: legs[position].id,
            provider: provider.to_string(),
            status: outcome.status.as_str().to_string(),
            eta_minutes: outcome.eta_minutes,
            fare_cents: outcome.fare_cents,
        },
    )
    .await?;

    tracing::info!(
        booking_id = booking.id,
        plan_id = plan.id,
        status = %booking.status,
        "Ride booked",
    );

    Ok(Json(CreateBookingResponse::Booked {
        booking_id: booking.id,
        status: booking.status,
        eta_minutes: booking.eta_minutes,
        fare_cents: booking.fare_cents,
    }))
}

/// GET /v1/bookings/{id}
pub async fn get(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<Json<RideBooking>> {
    let booking = RideBookingRepo::find_owned(&state.pool, booking_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("RideBooking", booking_id))?;
    Ok(Json(booking))
}
