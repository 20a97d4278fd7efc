use axum::routing::{get, post};
use axum::Router;

use crate::handlers::trips;
use crate::state::AppState;

/// Routes mounted at `/v1/trips`.
///
/// ```text
/// POST /plan                -> plan
/// GET  /plans/{id}          -> get_plan
/// POST /plans/{id}/select   -> select
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plan", post(trips::plan))
        .route("/plans/{id}", get(trips::get_plan))
        .route("/plans/{id}/select", post(trips::select))
}
