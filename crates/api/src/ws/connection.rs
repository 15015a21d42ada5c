use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use wardwatch_core::types::Timestamp;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::Sender<Message>;

/// Lifecycle of a relay connection. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::Open,
            _ => Self::Closed,
        }
    }
}

/// Why a message could not be queued for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The outbound queue is at capacity; the message was dropped.
    #[error("outbound queue full")]
    QueueFull,
    /// The writer side is gone; the connection cannot receive anymore.
    #[error("connection writer closed")]
    Disconnected,
}

/// A single relay connection.
///
/// State transitions are atomic so a broadcast working from a snapshot can
/// observe a concurrent close without holding the connection map lock.
/// Closing also cancels [`closed_token`](Self::closed_token), which tells the
/// socket task to send a Close frame and hang up.
pub struct WsConnection {
    id: String,
    sender: WsSender,
    state: AtomicU8,
    drops: AtomicU64,
    closed: CancellationToken,
    connected_at: Timestamp,
}

impl WsConnection {
    /// Create a connection in the `Connecting` state.
    pub fn new(id: String, sender: WsSender) -> Self {
        Self {
            id,
            sender,
            state: AtomicU8::new(0),
            drops: AtomicU64::new(0),
            closed: CancellationToken::new(),
            connected_at: chrono::Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Move `Connecting -> Open`. Returns `false` if the connection was not
    /// in `Connecting`.
    pub fn mark_open(&self) -> bool {
        self.state
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Move to `Closed` and signal the socket task. Returns `true` if this
    /// call performed the transition.
    pub fn mark_closed(&self) -> bool {
        let transitioned = self.state.swap(2, Ordering::AcqRel) != 2;
        self.closed.cancel();
        transitioned
    }

    /// Token cancelled once the connection is closed.
    pub fn closed_token(&self) -> CancellationToken {
        self.closed.clone()
    }

    /// Total messages dropped because the outbound queue was full.
    pub fn drop_count(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    /// Queue a relayed message without waiting. A full queue counts as a drop.
    pub fn try_deliver(&self, message: Message) -> Result<(), DeliveryError> {
        let result = self.enqueue(message);
        if result == Err(DeliveryError::QueueFull) {
            self.drops.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    /// Queue a control frame (ping, close) without waiting. Never counts
    /// towards the drop total.
    pub fn try_control(&self, message: Message) -> Result<(), DeliveryError> {
        self.enqueue(message)
    }

    fn enqueue(&self, message: Message) -> Result<(), DeliveryError> {
        match self.sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DeliveryError::QueueFull),
            Err(TrySendError::Closed(_)) => Err(DeliveryError::Disconnected),
        }
    }
}

impl std::fmt::Debug for WsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsConnection")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("drops", &self.drop_count())
            .field("connected_at", &self.connected_at)
            .finish()
    }
}
