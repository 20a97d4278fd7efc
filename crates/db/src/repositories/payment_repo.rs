//! Repository for the `payments` table.
//!
//! Every payment row belongs to a booking through `payments.booking_id`, and
//! ownership of a payment is the ownership of that booking's plan. The
//! booking's `payment_id` points at its current payment; earlier declined
//! attempts stay readable through `booking_id`.

use navmate_core::payment::PaymentStatus;
use navmate_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::payment::{CreatePayment, Payment};

const COLUMNS: &str =
    "id, booking_id, amount_cents, currency, status, external_ref, created_at, updated_at";

/// A booking row held `FOR UPDATE` while an authorization is obtained.
///
/// Dropping the lock without calling [`BookingPaymentLock::record`] rolls the
/// transaction back and releases the row.
pub struct BookingPaymentLock {
    tx: Transaction<'static, Postgres>,
    booking_id: DbId,
    current: Option<Payment>,
}

impl BookingPaymentLock {
    /// The booking's current payment, unless it was declined.
    pub fn live_payment(&self) -> Option<&Payment> {
        self.current
            .as_ref()
            .filter(|p| p.status != PaymentStatus::Declined.as_str())
    }

    /// Insert the authorization outcome, make it the booking's current
    /// payment and commit.
    pub async fn record(mut self, input: &CreatePayment) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments (booking_id, amount_cents, currency, status, external_ref)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let payment = sqlx::query_as::<_, Payment>(&query)
            .bind(self.booking_id)
            .bind(input.amount_cents)
            .bind(&input.currency)
            .bind(&input.status)
            .bind(&input.external_ref)
            .fetch_one(&mut *self.tx)
            .await?;

        sqlx::query("UPDATE ride_bookings SET payment_id = $2 WHERE id = $1")
            .bind(self.booking_id)
            .bind(payment.id)
            .execute(&mut *self.tx)
            .await?;

        self.tx.commit().await?;
        Ok(payment)
    }
}

/// Provides operations on payments.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Lock `booking_id` and load its current payment.
    ///
    /// Concurrent authorizations on the same booking queue on this lock, so
    /// the second one sees the first one's payment. Returns `None` when the
    /// booking does not exist.
    pub async fn lock_booking(
        pool: &PgPool,
        booking_id: DbId,
    ) -> Result<Option<BookingPaymentLock>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(Option<DbId>,)> =
            sqlx::query_as("SELECT payment_id FROM ride_bookings WHERE id = $1 FOR UPDATE")
                .bind(booking_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((current_id,)) = locked else {
            return Ok(None);
        };

        let current = match current_id {
            Some(id) => {
                let query = format!("SELECT {COLUMNS} FROM payments WHERE id = $1");
                sqlx::query_as::<_, Payment>(&query)
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?
            }
            None => None,
        };

        Ok(Some(BookingPaymentLock {
            tx,
            booking_id,
            current,
        }))
    }

    /// Find a payment by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE id = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a payment, only if the booking it belongs to is on a plan owned
    /// by `user_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments
             WHERE id = $1
               AND booking_id IN (
                   SELECT b.id FROM ride_bookings b
                   JOIN trip_plans p ON p.id = b.plan_id
                   WHERE p.user_id = $2
               )"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List every authorization attempt made for a booking, oldest first.
    pub async fn list_by_booking(
        pool: &PgPool,
        booking_id: DbId,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE booking_id = $1 ORDER BY id");
        sqlx::query_as::<_, Payment>(&query)
            .bind(booking_id)
            .fetch_all(pool)
            .await
    }

    /// Find the most recent payment carrying a provider reference.
    pub async fn find_by_external_ref(
        pool: &PgPool,
        external_ref: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments WHERE external_ref = $1 ORDER BY id DESC LIMIT 1"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(external_ref)
            .fetch_optional(pool)
            .await
    }

    /// Move a payment from `from` to `to`.
    ///
    /// The update only applies while the stored status is still `from`, so
    /// of two concurrent transitions at most one succeeds. Returns `None`
    /// when the guard did not match.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET status = $3
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }
}
