use axum::routing::get;
use axum::Router;

use crate::handlers::google;
use crate::state::AppState;

/// Routes mounted at `/auth/google`, outside `/v1` so the redirect URL
/// registered with Google stays stable.
///
/// ```text
/// GET /login      -> login (redirect to consent page)
/// GET /callback   -> callback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(google::login))
        .route("/callback", get(google::callback))
}
