pub mod auth;
pub mod bookings;
pub mod contacts;
pub mod google;
pub mod health;
pub mod payments;
pub mod safety;
pub mod trips;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                          signup (public)
/// /auth/login                           login (public)
/// /me                                   current user
/// /me/contacts                          list, create emergency contacts
/// /me/contacts/{id}                     delete emergency contact
///
/// /trips/plan                           plan a trip (POST)
/// /trips/plans/{id}                     plan with itineraries and legs
/// /trips/plans/{id}/select              select an itinerary (POST)
///
/// /bookings                             book the selected ride (POST)
/// /bookings/{id}                        get booking
///
/// /payments/authorize                   authorize (POST)
/// /payments/webhook                     provider webhook (public, POST)
/// /payments/{id}                        get payment
/// /payments/{id}/capture                capture (POST)
/// /payments/{id}/refund                 refund (POST)
///
/// /safety/session                       start session (POST)
/// /safety/session/{id}                  session with heartbeats
/// /safety/session/{id}/end              end session (POST)
/// /safety/heartbeat/ack                 acknowledge heartbeat (POST)
/// /safety/sos                           raise SOS (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .route("/me", get(handlers::auth::me))
        .nest("/me/contacts", contacts::router())
        .nest("/trips", trips::router())
        .nest("/bookings", bookings::router())
        .nest("/payments", payments::router())
        .nest("/safety", safety::router())
}
