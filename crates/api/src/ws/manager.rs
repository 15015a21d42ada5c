use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::config::RelayConfig;
use crate::ws::connection::{DeliveryError, WsConnection};

/// Outcome of a single fan-out round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Open targets a delivery was attempted for.
    pub attempted: usize,
    /// Targets the message was queued for.
    pub delivered: usize,
    /// Targets whose full queue dropped the message.
    pub dropped: usize,
    /// Targets closed and removed during this round.
    pub closed: usize,
}

/// Manages all active relay connections.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application. Broadcasts clone the connection handles
/// under the read lock and deliver after releasing it, so a connect or
/// disconnect never waits on a fan-out.
pub struct WsManager {
    connections: RwLock<HashMap<String, Arc<WsConnection>>>,
    config: RelayConfig,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new(config: RelayConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Register a new connection and open it.
    ///
    /// Returns the receiver half of the bounded outbound queue so the caller
    /// can forward messages to the WebSocket sink, and the token cancelled
    /// when the relay closes the connection. Re-using an ID closes the
    /// connection previously registered under it.
    pub async fn add(&self, conn_id: String) -> (mpsc::Receiver<Message>, CancellationToken) {
        let (tx, rx) = mpsc::channel(self.config.queue_capacity);
        let conn = Arc::new(WsConnection::new(conn_id.clone(), tx));
        conn.mark_open();
        let closed = conn.closed_token();

        let previous = self.connections.write().await.insert(conn_id, conn);
        if let Some(previous) = previous {
            previous.mark_closed();
            tracing::debug!(conn_id = %previous.id(), "Replaced existing relay connection");
        }
        (rx, closed)
    }

    /// Close and remove a connection by its ID. Unknown IDs are a no-op.
    pub async fn remove(&self, conn_id: &str) {
        if let Some(conn) = self.connections.write().await.remove(conn_id) {
            conn.mark_closed();
        }
    }

    /// Whether the given connection is registered and open.
    pub async fn is_open(&self, conn_id: &str) -> bool {
        self.connections
            .read()
            .await
            .get(conn_id)
            .is_some_and(|conn| conn.is_open())
    }

    /// Relay an inbound message from `sender_id` to every open connection,
    /// the sender included.
    ///
    /// Messages from a sender that is not open are discarded.
    pub async fn relay(&self, sender_id: &str, message: Message) -> BroadcastReport {
        if !self.is_open(sender_id).await {
            tracing::debug!(conn_id = %sender_id, "Discarding message from closed connection");
            return BroadcastReport::default();
        }

        let report = self.fan_out(message).await;
        tracing::trace!(
            conn_id = %sender_id,
            attempted = report.attempted,
            delivered = report.delivered,
            dropped = report.dropped,
            closed = report.closed,
            "Relayed message"
        );
        report
    }

    /// Broadcast a server-originated message to every open connection.
    pub async fn broadcast(&self, message: Message) -> BroadcastReport {
        let report = self.fan_out(message).await;
        tracing::debug!(
            delivered = report.delivered,
            dropped = report.dropped,
            "Broadcast message"
        );
        report
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Close every connection, then clear the map.
    ///
    /// Each socket task sends its client a Close frame and exits. Used during
    /// graceful shutdown.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            conn.mark_closed();
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones. A full queue skips the ping without counting a drop;
    /// a gone writer closes and evicts the connection.
    pub async fn ping_all(&self) {
        let mut closed = Vec::new();

        for conn in self.snapshot().await {
            if !conn.is_open() {
                continue;
            }
            match conn.try_control(Message::Ping(Bytes::new())) {
                Ok(()) => {}
                Err(DeliveryError::QueueFull) => {
                    tracing::trace!(conn_id = %conn.id(), "Relay queue full, ping skipped");
                }
                Err(e @ DeliveryError::Disconnected) => {
                    tracing::debug!(conn_id = %conn.id(), error = %e, "Heartbeat ping failed");
                    if conn.mark_closed() {
                        closed.push(conn);
                    }
                }
            }
        }

        if !closed.is_empty() {
            self.evict(&closed).await;
        }
    }

    /// Clone the current connection handles.
    async fn snapshot(&self) -> Vec<Arc<WsConnection>> {
        self.connections.read().await.values().cloned().collect()
    }

    /// Deliver `message` once to every connection open at iteration time.
    ///
    /// A failed delivery only affects its own target: full queues drop the
    /// message (and disconnect the target past `max_drops`), closed writers
    /// close the target.
    async fn fan_out(&self, message: Message) -> BroadcastReport {
        let targets = self.snapshot().await;
        let mut report = BroadcastReport::default();
        let mut closed = Vec::new();

        for conn in &targets {
            if !conn.is_open() {
                continue;
            }
            report.attempted += 1;

            match conn.try_deliver(message.clone()) {
                Ok(()) => report.delivered += 1,
                Err(DeliveryError::QueueFull) => {
                    report.dropped += 1;
                    let drops = conn.drop_count();
                    if self.config.max_drops > 0 && drops >= self.config.max_drops {
                        tracing::warn!(
                            conn_id = %conn.id(),
                            drops,
                            "Disconnecting slow relay client"
                        );
                        if conn.mark_closed() {
                            closed.push(Arc::clone(conn));
                        }
                    } else {
                        tracing::debug!(
                            conn_id = %conn.id(),
                            drops,
                            "Relay queue full, message dropped"
                        );
                    }
                }
                Err(e @ DeliveryError::Disconnected) => {
                    tracing::debug!(conn_id = %conn.id(), error = %e, "Relay delivery failed");
                    if conn.mark_closed() {
                        closed.push(Arc::clone(conn));
                    }
                }
            }
        }

        report.closed = closed.len();
        if !closed.is_empty() {
            self.evict(&closed).await;
        }
        report
    }

    /// Remove closed connections, leaving any newer connection that re-used
    /// the same ID in place.
    async fn evict(&self, closed: &[Arc<WsConnection>]) {
        let mut conns = self.connections.write().await;
        for conn in closed {
            if conns
                .get(conn.id())
                .is_some_and(|current| Arc::ptr_eq(current, conn))
            {
                conns.remove(conn.id());
            }
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new(RelayConfig::default())
    }
}
