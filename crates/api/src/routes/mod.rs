pub mod health;
pub mod patients;
pub mod sessions;
pub mod vitals;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                          relay WebSocket
///
/// /vitals                                      record reading (POST)
/// /vitals/classify                             classify without storing (POST)
/// /vitals/thresholds                           threshold table (GET)
///
/// /monitoring-sessions                         start session (POST)
/// /monitoring-sessions/{id}                    get session
/// /monitoring-sessions/{id}/end                end session (POST)
/// /monitoring-sessions/{id}/summary            session summary (GET)
/// /monitoring-sessions/{id}/vitals             session readings (GET)
///
/// /patients/{id}/vitals                        reading history (GET)
/// /patients/{id}/monitoring-sessions           session list (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/vitals", vitals::router())
        .nest("/monitoring-sessions", sessions::router())
        .nest("/patients", patients::router())
}
