use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/v1/payments`.
///
/// ```text
/// POST /authorize      -> authorize
/// POST /webhook        -> webhook (public)
/// GET  /{id}           -> get
/// POST /{id}/capture   -> capture
/// POST /{id}/refund    -> refund
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/authorize", post(payments::authorize))
        .route("/webhook", post(payments::webhook))
        .route("/{id}", get(payments::get))
        .route("/{id}/capture", post(payments::capture))
        .route("/{id}/refund", post(payments::refund))
}
