//! WebSocket broadcast relay.
//!
//! One implicit global channel: every text or binary frame received from a
//! client is re-sent unchanged to every open client, the sender included.
//! Provides connection management, heartbeat monitoring, and the HTTP
//! upgrade handler used by Axum routes.

pub mod connection;
mod handler;
mod heartbeat;
pub mod manager;

pub use connection::{ConnectionState, DeliveryError, WsConnection};
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::{BroadcastReport, WsManager};
