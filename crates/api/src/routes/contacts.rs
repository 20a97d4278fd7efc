use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::contacts;
use crate::state::AppState;

/// Routes mounted at `/v1/me/contacts`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(contacts::list).post(contacts::create))
        .route("/{id}", delete(contacts::delete))
}
