//! Route definitions for vitals ingestion and classification.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::vitals;
use crate::state::AppState;

/// Routes mounted at `/vitals`.
///
/// ```text
/// POST /                -> record_vital
/// POST /classify        -> classify_reading
/// GET  /thresholds      -> list_thresholds
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(vitals::record_vital))
        .route("/classify", post(vitals::classify_reading))
        .route("/thresholds", get(vitals::list_thresholds))
}
