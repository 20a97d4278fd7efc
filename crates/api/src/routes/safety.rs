use axum::routing::{get, post};
use axum::Router;

use crate::handlers::safety;
use crate::state::AppState;

/// Routes mounted at `/v1/safety`.
///
/// ```text
/// POST /session            -> start
/// GET  /session/{id}       -> get_session
/// POST /session/{id}/end   -> end
/// POST /heartbeat/ack      -> ack
/// POST /sos                -> sos
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", post(safety::start))
        .route("/session/{id}", get(safety::get_session))
        .route("/session/{id}/end", post(safety::end))
        .route("/heartbeat/ack", post(safety::ack))
        .route("/sos", post(safety::sos))
}

/// Public share page, mounted at the root.
///
/// ```text
/// GET /safety/s/{token}   -> public_status
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new().route("/safety/s/{token}", get(safety::public_status))
}
