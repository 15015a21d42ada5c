//! WebSocket connection and reading push loop.
//!
//! Connects to the relay, pushes one envelope per measurement type on
//! every tick, and drains whatever the relay sends back (including the
//! echo of our own readings).

use std::time::Duration;

use chrono::Utc;
use futures::{Sink, SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use wardwatch_core::types::DbId;

use crate::generator::{ReadingEnvelope, ReadingGenerator};

/// Reconnection delay after a WebSocket failure.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Run the push loop indefinitely.
///
/// Never returns under normal operation. Reconnects with a fixed delay
/// whenever the connection drops; the random walk carries over.
pub async fn run(
    ws_url: &str,
    patient_id: DbId,
    interval: Duration,
    generator: &mut ReadingGenerator,
) {
    loop {
        tracing::info!(url = %ws_url, "Connecting to relay");

        match connect_async(ws_url).await {
            Ok((ws_stream, _response)) => {
                tracing::info!("Relay connected");
                run_session(ws_stream, patient_id, interval, generator).await;
                tracing::warn!("Relay session ended, reconnecting");
            }
            Err(e) => {
                tracing::error!(error = %e, "Relay connection failed");
            }
        }

        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// Drive a single relay session: push readings on a timer and count
/// inbound frames via `tokio::select!`.
async fn run_session(
    ws_stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    patient_id: DbId,
    interval: Duration,
    generator: &mut ReadingGenerator,
) {
    let (mut sink, mut stream) = ws_stream.split();
    let mut ticker = tokio::time::interval(interval);
    let mut inbound: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let batch = generator.next_batch(patient_id, Utc::now());
                if let Err(e) = send_batch(&mut sink, &batch).await {
                    tracing::error!(error = %e, "Failed to send readings");
                    break;
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(_) | Message::Binary(_))) => {
                        inbound += 1;
                        tracing::debug!(inbound, "Relay frame received");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Relay closed WebSocket");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Ping / Pong / Frame are handled by tungstenite.
                    }
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "WebSocket receive error");
                        break;
                    }
                    None => {
                        tracing::info!("WebSocket stream exhausted");
                        break;
                    }
                }
            }
        }
    }
}

/// Serialise one envelope as a relay text frame.
pub fn to_frame(envelope: &ReadingEnvelope) -> Message {
    let json = serde_json::to_string(envelope).expect("ReadingEnvelope is always serialisable");
    Message::Text(json)
}

/// Send every envelope of a batch as its own text frame.
pub async fn send_batch<S>(sink: &mut S, batch: &[ReadingEnvelope]) -> Result<(), S::Error>
where
    S: Sink<Message> + Unpin,
{
    for envelope in batch {
        if envelope.status.is_anomalous() {
            tracing::warn!(
                patient_id = envelope.patient_id,
                measurement_type = envelope.measurement_type,
                value = envelope.value,
                status = %envelope.status,
                "Sending abnormal reading"
            );
        } else {
            tracing::debug!(
                patient_id = envelope.patient_id,
                measurement_type = envelope.measurement_type,
                value = envelope.value,
                "Sending reading"
            );
        }
        sink.send(to_frame(envelope)).await?;
    }
    Ok(())
}
