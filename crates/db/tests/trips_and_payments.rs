//! Integration tests for the plan -> itinerary -> leg -> booking -> payment
//! chain against a real database.

use assert_matches::assert_matches;
use navmate_core::payment::PaymentStatus;
use navmate_core::providers::fallback_itineraries;
use navmate_core::types::DbId;
use navmate_db::models::booking::CreateRideBooking;
use navmate_db::models::payment::{CreatePayment, Payment};
use navmate_db::models::trip::CreateTripPlan;
use navmate_db::models::user::{CreateUser, PROVIDER_LOCAL};
use navmate_db::repositories::{
    ItineraryRepo, PaymentRepo, RideBookingRepo, TripPlanRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "x".to_string(),
            provider: PROVIDER_LOCAL.to_string(),
            google_id: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn new_plan(user_id: DbId) -> CreateTripPlan {
    CreateTripPlan {
        user_id,
        origin: "Home".to_string(),
        destination: "Office".to_string(),
        depart_at: None,
    }
}

/// Seed a plan and a booking on its ride itinerary, returning the booking id.
async fn seed_booking(pool: &PgPool, user_id: DbId) -> DbId {
    let (plan, itineraries) =
        TripPlanRepo::create_with_options(pool, &new_plan(user_id), &fallback_itineraries("Home", "Office"))
            .await
            .unwrap();
    let ride = &itineraries[0];
    let legs = ItineraryRepo::list_legs(pool, ride.id).await.unwrap();
    RideBookingRepo::create(
        pool,
        &CreateRideBooking {
            plan_id: plan.id,
            itinerary_id: ride.id,
            leg_id: legs[0].id,
            provider: "RideNow".to_string(),
            status: "confirmed".to_string(),
            eta_minutes: 5,
            fare_cents: 12_000,
        },
    )
    .await
    .unwrap()
    .id
}

fn payment(status: PaymentStatus, external_ref: &str) -> CreatePayment {
    CreatePayment {
        amount_cents: 12_000,
        currency: "THB".to_string(),
        status: status.as_str().to_string(),
        external_ref: external_ref.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_plan_is_stored_with_ordered_legs(pool: PgPool) {
    let user = seed_user(&pool, "a@example.com").await;
    let (plan, itineraries) =
        TripPlanRepo::create_with_options(&pool, &new_plan(user), &fallback_itineraries("Home", "Office"))
            .await
            .unwrap();

    assert_eq!(plan.status, "planned");
    assert_eq!(itineraries.len(), 2);

    let legs = ItineraryRepo::list_legs(&pool, itineraries[1].id).await.unwrap();
    let indexes: Vec<i32> = legs.iter().map(|l| l.index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
    assert_eq!(legs[0].from_name, "Home");
    assert_eq!(legs[2].to_name, "Office");

    let all = ItineraryRepo::list_legs_for_plan(&pool, plan.id).await.unwrap();
    assert_eq!(all.len(), 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_plan_lookup_is_scoped_to_owner(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com").await;
    let other = seed_user(&pool, "other@example.com").await;
    let (plan, _) =
        TripPlanRepo::create_with_options(&pool, &new_plan(owner), &fallback_itineraries("A", "B"))
            .await
            .unwrap();

    assert!(TripPlanRepo::find_owned(&pool, plan.id, owner).await.unwrap().is_some());
    assert!(TripPlanRepo::find_owned(&pool, plan.id, other).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_select_itinerary_guards_plan_status(pool: PgPool) {
    let user = seed_user(&pool, "a@example.com").await;
    let (plan, itineraries) =
        TripPlanRepo::create_with_options(&pool, &new_plan(user), &fallback_itineraries("A", "B"))
            .await
            .unwrap();

    let selected = TripPlanRepo::select_itinerary(&pool, plan.id, itineraries[0].id)
        .await
        .unwrap()
        .expect("planned plan is selectable");
    assert_eq!(selected.status, "selected");
    assert_eq!(selected.selected_itinerary_id, Some(itineraries[0].id));

    sqlx::query("UPDATE trip_plans SET status = 'active' WHERE id = $1")
        .bind(plan.id)
        .execute(&pool)
        .await
        .unwrap();
    assert!(TripPlanRepo::select_itinerary(&pool, plan.id, itineraries[1].id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ride_leg_requires_provider(pool: PgPool) {
    let user = seed_user(&pool, "a@example.com").await;
    let (_, itineraries) =
        TripPlanRepo::create_with_options(&pool, &new_plan(user), &fallback_itineraries("A", "B"))
            .await
            .unwrap();

    let result = sqlx::query(
        "INSERT INTO legs (itinerary_id, leg_index, mode, from_name, to_name, minutes, distance_m)
         VALUES ($1, 9, 'RIDE', 'A', 'B', 5, 100)",
    )
    .bind(itineraries[0].id)
    .execute(&pool)
    .await;
    assert!(result.is_err(), "RIDE leg without provider must be rejected");
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// Lock the booking and record `input` as its new payment.
async fn record(pool: &PgPool, booking_id: DbId, input: &CreatePayment) -> Payment {
    PaymentRepo::lock_booking(pool, booking_id)
        .await
        .unwrap()
        .expect("booking exists")
        .record(input)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_authorization_links_payment_to_booking(pool: PgPool) {
    let user = seed_user(&pool, "a@example.com").await;
    let booking_id = seed_booking(&pool, user).await;

    let declined = record(&pool, booking_id, &payment(PaymentStatus::Declined, "pay_1")).await;
    assert_eq!(declined.status, "declined");
    assert_eq!(declined.booking_id, booking_id);
    let booking = RideBookingRepo::find_owned(&pool, booking_id, user).await.unwrap().unwrap();
    assert_eq!(booking.payment_id, Some(declined.id));

    // A declined payment does not block a new authorization.
    let lock = PaymentRepo::lock_booking(&pool, booking_id).await.unwrap().unwrap();
    assert!(lock.live_payment().is_none());
    let authorized = lock.record(&payment(PaymentStatus::Authorized, "pay_2")).await.unwrap();

    // An authorized one does.
    let lock = PaymentRepo::lock_booking(&pool, booking_id).await.unwrap().unwrap();
    assert_matches!(lock.live_payment(), Some(p) if p.id == authorized.id);
    drop(lock);

    // Both attempts stay attached to the booking and visible to its owner.
    let attempts = PaymentRepo::list_by_booking(&pool, booking_id).await.unwrap();
    let ids: Vec<DbId> = attempts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![declined.id, authorized.id]);
    assert!(PaymentRepo::find_owned(&pool, declined.id, user).await.unwrap().is_some());
    assert!(PaymentRepo::find_owned(&pool, authorized.id, user).await.unwrap().is_some());

    let stranger = seed_user(&pool, "b@example.com").await;
    assert!(PaymentRepo::find_owned(&pool, authorized.id, stranger).await.unwrap().is_none());
    assert!(PaymentRepo::find_owned(&pool, declined.id, stranger).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lock_on_missing_booking(pool: PgPool) {
    assert!(PaymentRepo::lock_booking(&pool, 999_999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_guarded_transition_applies_once(pool: PgPool) {
    let user = seed_user(&pool, "a@example.com").await;
    let booking_id = seed_booking(&pool, user).await;
    let p = record(&pool, booking_id, &payment(PaymentStatus::Authorized, "pay_x")).await;

    let captured = PaymentRepo::transition(&pool, p.id, PaymentStatus::Authorized, PaymentStatus::Captured)
        .await
        .unwrap();
    assert_eq!(captured.map(|c| c.status), Some("captured".to_string()));

    let again = PaymentRepo::transition(&pool, p.id, PaymentStatus::Authorized, PaymentStatus::Captured)
        .await
        .unwrap();
    assert!(again.is_none());

    let by_ref = PaymentRepo::find_by_external_ref(&pool, "pay_x").await.unwrap().unwrap();
    assert_eq!(by_ref.id, p.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_booking_points_only_at_its_own_payments(pool: PgPool) {
    let user = seed_user(&pool, "a@example.com").await;
    let first = seed_booking(&pool, user).await;
    let second = seed_booking(&pool, user).await;
    let p = record(&pool, first, &payment(PaymentStatus::Authorized, "pay_y")).await;

    let result = sqlx::query("UPDATE ride_bookings SET payment_id = $2 WHERE id = $1")
        .bind(second)
        .bind(p.id)
        .execute(&pool)
        .await;
    assert_eq!(
        result.unwrap_err().as_database_error().and_then(|e| e.constraint()),
        Some("uq_ride_bookings_payment_id")
    );

    // Even once released by its booking, a payment cannot move to another.
    sqlx::query("UPDATE ride_bookings SET payment_id = NULL WHERE id = $1")
        .bind(first)
        .execute(&pool)
        .await
        .unwrap();
    let result = sqlx::query("UPDATE ride_bookings SET payment_id = $2 WHERE id = $1")
        .bind(second)
        .bind(p.id)
        .execute(&pool)
        .await;
    let err = result.unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("fk_ride_bookings_current_payment")
    );
}
