//! Trip plan, itinerary and leg models.

use navmate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `trip_plans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TripPlan {
    pub id: DbId,
    pub user_id: DbId,
    pub origin: String,
    pub destination: String,
    pub depart_at: Option<Timestamp>,
    pub status: String,
    pub selected_itinerary_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a plan.
#[derive(Debug, Clone)]
pub struct CreateTripPlan {
    pub user_id: DbId,
    pub origin: String,
    pub destination: String,
    pub depart_at: Option<Timestamp>,
}

/// A row from the `itineraries` table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Itinerary {
    pub id: DbId,
    pub plan_id: DbId,
    pub mode_mix: String,
    pub total_minutes: i32,
    pub rough_cost_cents: i64,
    pub created_at: Timestamp,
}

/// A row from the `legs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Leg {
    pub id: DbId,
    pub itinerary_id: DbId,
    #[sqlx(rename = "leg_index")]
    #[serde(rename = "index")]
    pub index: i32,
    pub mode: String,
    pub from_name: String,
    pub to_name: String,
    pub minutes: i32,
    pub distance_m: i64,
    /// Set only for `RIDE` legs.
    pub provider: Option<String>,
}
