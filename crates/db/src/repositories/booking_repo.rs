//! Repository for the `ride_bookings` table.

use navmate_core::types::DbId;
use sqlx::PgPool;

use crate::models::booking::{CreateRideBooking, RideBooking};

const COLUMNS: &str = "id, plan_id, itinerary_id, leg_id, provider, status, eta_minutes, \
    fare_cents, payment_id, created_at, updated_at";

/// Provides operations on ride bookings.
pub struct RideBookingRepo;

impl RideBookingRepo {
    /// Insert a booking, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRideBooking,
    ) -> Result<RideBooking, sqlx::Error> {
        let query = format!(
            "INSERT INTO ride_bookings
                (plan_id, itinerary_id, leg_id, provider, status, eta_minutes, fare_cents)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RideBooking>(&query)
            .bind(input.plan_id)
            .bind(input.itinerary_id)
            .bind(input.leg_id)
            .bind(&input.provider)
            .bind(&input.status)
            .bind(input.eta_minutes)
            .bind(input.fare_cents)
            .fetch_one(pool)
            .await
    }

    /// Find a booking, only if its plan belongs to `user_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<RideBooking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ride_bookings
             WHERE id = $1
               AND plan_id IN (SELECT id FROM trip_plans WHERE user_id = $2)"
        );
        sqlx::query_as::<_, RideBooking>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
