//! Route definitions for monitoring sessions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Routes mounted at `/monitoring-sessions`.
///
/// ```text
/// POST /                -> start_session
/// GET  /{id}            -> get_session
/// POST /{id}/end        -> end_session
/// GET  /{id}/summary    -> session_summary
/// GET  /{id}/vitals     -> list_session_vitals
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sessions::start_session))
        .route("/{id}", get(sessions::get_session))
        .route("/{id}/end", post(sessions::end_session))
        .route("/{id}/summary", get(sessions::session_summary))
        .route("/{id}/vitals", get(sessions::list_session_vitals))
}
