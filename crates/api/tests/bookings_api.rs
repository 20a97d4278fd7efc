//! HTTP-level integration tests for ride bookings.

mod common;

use axum::http::StatusCode;
use common::{body_json, booked_trip, get_auth, plan_trip, post_json_auth, select, signup_and_login};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_booking_ride_itinerary_confirms_at_rough_cost(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup_and_login(&app, "booker@example.com").await;
    let (plan_id, ids) = plan_trip(&app, &token).await;
    select(&app, &token, plan_id, ids[1]).await;

    let response = post_json_auth(
        app.clone(),
        "/v1/bookings",
        &token,
        serde_json::json!({ "plan_id": plan_id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "confirmed");
    assert_eq!(json["eta_minutes"], 5);
    assert_eq!(json["fare_cents"], 12_000);
    let booking_id = json["booking_id"].as_i64().unwrap();

    let response = get_auth(app, &format!("/v1/bookings/{booking_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["plan_id"], plan_id);
    assert_eq!(json["itinerary_id"], ids[1]);
    assert!(json["payment_id"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_booking_mixed_itinerary_books_the_ride_leg(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup_and_login(&app, "mixed@example.com").await;
    let (plan_id, ids) = plan_trip(&app, &token).await;
    select(&app, &token, plan_id, ids[2]).await;

    let response = post_json_auth(
        app.clone(),
        "/v1/bookings",
        &token,
        serde_json::json!({ "plan_id": plan_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let booking_id = body_json(response).await["booking_id"].as_i64().unwrap();

    let plan = body_json(get_auth(app.clone(), &format!("/v1/trips/plans/{plan_id}"), &token).await).await;
    let ride_leg_id = plan["itineraries"][2]["legs"][2]["id"].clone();

    let booking = body_json(get_auth(app, &format!("/v1/bookings/{booking_id}"), &token).await).await;
    assert_eq!(booking["leg_id"], ride_leg_id);
    assert_eq!(booking["fare_cents"], 9_000);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_booking_without_ride_legs_books_nothing(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup_and_login(&app, "transit@example.com").await;
    let (plan_id, ids) = plan_trip(&app, &token).await;
    select(&app, &token, plan_id, ids[0]).await;

    let response = post_json_auth(
        app,
        "/v1/bookings",
        &token,
        serde_json::json!({ "plan_id": plan_id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "no ride legs; nothing to book");
    assert_eq!(json["itinerary_id"], ids[0]);
    assert!(json.get("booking_id").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_booking_unselected_plan_returns_409(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup_and_login(&app, "early@example.com").await;
    let (plan_id, _) = plan_trip(&app, &token).await;

    let response = post_json_auth(
        app,
        "/v1/bookings",
        &token,
        serde_json::json!({ "plan_id": plan_id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "plan not selected");
    assert_eq!(json["current_state"], "planned");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bookings_are_private_to_their_owner(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = signup_and_login(&app, "owner@example.com").await;
    let other = signup_and_login(&app, "other@example.com").await;
    let (plan_id, booking_id) = booked_trip(&app, &owner).await;

    let response = get_auth(app.clone(), &format!("/v1/bookings/{booking_id}"), &other).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        app,
        "/v1/bookings",
        &other,
        serde_json::json!({ "plan_id": plan_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
