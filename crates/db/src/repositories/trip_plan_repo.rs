//! Repository for the `trip_plans` table.

use navmate_core::providers::ItineraryOption;
use navmate_core::trip::PlanStatus;
use navmate_core::types::DbId;
use sqlx::PgPool;

use crate::models::trip::{CreateTripPlan, Itinerary, TripPlan};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, origin, destination, depart_at, status, \
    selected_itinerary_id, created_at, updated_at";

const ITINERARY_COLUMNS: &str =
    "id, plan_id, mode_mix, total_minutes, rough_cost_cents, created_at";

/// Provides operations on trip plans.
pub struct TripPlanRepo;

impl TripPlanRepo {
    /// Insert a plan together with its itineraries and their ordered legs.
    ///
    /// Runs in one transaction: either the whole plan is stored or nothing.
    /// Itineraries are returned in the order of `options`.
    pub async fn create_with_options(
        pool: &PgPool,
        input: &CreateTripPlan,
        options: &[ItineraryOption],
    ) -> Result<(TripPlan, Vec<Itinerary>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO trip_plans (user_id, origin, destination, depart_at, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let plan = sqlx::query_as::<_, TripPlan>(&query)
            .bind(input.user_id)
            .bind(&input.origin)
            .bind(&input.destination)
            .bind(input.depart_at)
            .bind(PlanStatus::Planned.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let itinerary_query = format!(
            "INSERT INTO itineraries (plan_id, mode_mix, total_minutes, rough_cost_cents)
             VALUES ($1, $2, $3, $4)
             RETURNING {ITINERARY_COLUMNS}"
        );
        let mut itineraries = Vec::with_capacity(options.len());
        for option in options {
            let itinerary = sqlx::query_as::<_, Itinerary>(&itinerary_query)
                .bind(plan.id)
                .bind(&option.mode_mix)
                .bind(option.total_minutes)
                .bind(option.rough_cost_cents)
                .fetch_one(&mut *tx)
                .await?;

            for (index, leg) in option.legs.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO legs
                        (itinerary_id, leg_index, mode, from_name, to_name, minutes, distance_m, provider)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                )
                .bind(itinerary.id)
                .bind(index as i32)
                .bind(leg.mode.as_str())
                .bind(&leg.from)
                .bind(&leg.to)
                .bind(leg.minutes)
                .bind(leg.distance_m)
                .bind(&leg.provider)
                .execute(&mut *tx)
                .await?;
            }

            itineraries.push(itinerary);
        }

        tx.commit().await?;
        Ok((plan, itineraries))
    }

    /// Find a plan by ID, only if it belongs to `user_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<TripPlan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trip_plans WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, TripPlan>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Record the selected itinerary and move the plan to `selected`.
    ///
    /// Only applies while the plan is still `planned` or `selected`;
    /// returns `None` when a concurrent change moved it past that point.
    pub async fn select_itinerary(
        pool: &PgPool,
        plan_id: DbId,
        itinerary_id: DbId,
    ) -> Result<Option<TripPlan>, sqlx::Error> {
        let query = format!(
            "UPDATE trip_plans SET selected_itinerary_id = $2, status = $3
             WHERE id = $1 AND status IN ($4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TripPlan>(&query)
            .bind(plan_id)
            .bind(itinerary_id)
            .bind(PlanStatus::Selected.as_str())
            .bind(PlanStatus::Planned.as_str())
            .bind(PlanStatus::Selected.as_str())
            .fetch_optional(pool)
            .await
    }
}
