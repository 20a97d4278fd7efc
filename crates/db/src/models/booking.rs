//! Ride booking model and DTOs.

use navmate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `ride_bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RideBooking {
    pub id: DbId,
    pub plan_id: DbId,
    pub itinerary_id: DbId,
    pub leg_id: DbId,
    pub provider: String,
    pub status: String,
    pub eta_minutes: i32,
    pub fare_cents: i64,
    pub payment_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a ride provider outcome.
#[derive(Debug, Clone)]
pub struct CreateRideBooking {
    pub plan_id: DbId,
    pub itinerary_id: DbId,
    /// Must reference a `RIDE` leg with a provider.
    pub leg_id: DbId,
    pub provider: String,
    pub status: String,
    pub eta_minutes: i32,
    pub fare_cents: i64,
}
