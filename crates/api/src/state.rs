use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: wardwatch_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Broadcast relay connection manager.
    pub ws_manager: Arc<WsManager>,
}
