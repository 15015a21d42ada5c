//! Patient-scoped read routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::{sessions, vitals};
use crate::state::AppState;

/// Routes mounted at `/patients`.
///
/// ```text
/// GET /{id}/vitals                -> list_patient_vitals
/// GET /{id}/monitoring-sessions   -> list_patient_sessions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/vitals", get(vitals::list_patient_vitals))
        .route(
            "/{id}/monitoring-sessions",
            get(sessions::list_patient_sessions),
        )
}
