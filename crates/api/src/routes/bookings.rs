use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bookings;
use crate::state::AppState;

/// Routes mounted at `/v1/bookings`.
///
/// ```text
/// POST /       -> create
/// GET  /{id}   -> get
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(bookings::create))
        .route("/{id}", get(bookings::get))
}
