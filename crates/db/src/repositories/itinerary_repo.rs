//! Repository for the `itineraries` and `legs` tables.

use navmate_core::types::DbId;
use sqlx::PgPool;

use crate::models::trip::{Itinerary, Leg};

const COLUMNS: &str = "id, plan_id, mode_mix, total_minutes, rough_cost_cents, created_at";

const LEG_COLUMNS: &str =
    "id, itinerary_id, leg_index, mode, from_name, to_name, minutes, distance_m, provider";

/// Read access to itineraries and their legs. Both are immutable once
/// stored by [`TripPlanRepo::create_with_options`](super::TripPlanRepo::create_with_options).
pub struct ItineraryRepo;

impl ItineraryRepo {
    /// List a plan's itineraries in creation order.
    pub async fn list_by_plan(pool: &PgPool, plan_id: DbId) -> Result<Vec<Itinerary>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM itineraries WHERE plan_id = $1 ORDER BY id");
        sqlx::query_as::<_, Itinerary>(&query)
            .bind(plan_id)
            .fetch_all(pool)
            .await
    }

    /// Find an itinerary, only if it belongs to `plan_id`.
    pub async fn find_in_plan(
        pool: &PgPool,
        id: DbId,
        plan_id: DbId,
    ) -> Result<Option<Itinerary>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM itineraries WHERE id = $1 AND plan_id = $2");
        sqlx::query_as::<_, Itinerary>(&query)
            .bind(id)
            .bind(plan_id)
            .fetch_optional(pool)
            .await
    }

    /// Legs of one itinerary in travel order.
    pub async fn list_legs(pool: &PgPool, itinerary_id: DbId) -> Result<Vec<Leg>, sqlx::Error> {
        let query = format!(
            "SELECT {LEG_COLUMNS} FROM legs WHERE itinerary_id = $1 ORDER BY leg_index"
        );
        sqlx::query_as::<_, Leg>(&query)
            .bind(itinerary_id)
            .fetch_all(pool)
            .await
    }

    /// Legs of every itinerary of a plan, grouped by itinerary and in
    /// travel order within each group.
    pub async fn list_legs_for_plan(pool: &PgPool, plan_id: DbId) -> Result<Vec<Leg>, sqlx::Error> {
        let query = format!(
            "SELECT {LEG_COLUMNS} FROM legs
             WHERE itinerary_id IN (SELECT id FROM itineraries WHERE plan_id = $1)
             ORDER BY itinerary_id, leg_index"
        );
        sqlx::query_as::<_, Leg>(&query)
            .bind(plan_id)
            .fetch_all(pool)
            .await
    }
}
