//! `wardwatch-wearable` -- simulated bedside wearable.
//!
//! Generates heart-rate and SpO2 readings for one patient and pushes
//! them to the WardWatch relay over WebSocket.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default | Description                               |
//! |-------------------------|----------|---------|-------------------------------------------|
//! | `RELAY_WS_URL`          | yes      | --      | Relay endpoint, e.g. `ws://host:3000/ws`  |
//! | `PATIENT_ID`            | yes      | --      | Positive integer ID of the patient        |
//! | `READING_INTERVAL_SECS` | no       | `5`     | Seconds between reading pushes            |

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wardwatch_wearable::generator::ReadingGenerator;
use wardwatch_wearable::sender;

/// Default interval between reading pushes.
const DEFAULT_INTERVAL_SECS: u64 = 5;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wardwatch_wearable=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let ws_url = std::env::var("RELAY_WS_URL").unwrap_or_else(|_| {
        tracing::error!("RELAY_WS_URL environment variable is required");
        std::process::exit(1);
    });

    let patient_id: i64 = std::env::var("PATIENT_ID")
        .unwrap_or_else(|_| {
            tracing::error!("PATIENT_ID environment variable is required");
            std::process::exit(1);
        })
        .parse()
        .ok()
        .filter(|id| *id > 0)
        .unwrap_or_else(|| {
            tracing::error!("PATIENT_ID must be a positive integer");
            std::process::exit(1);
        });

    let interval_secs: u64 = std::env::var("READING_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_INTERVAL_SECS);

    tracing::info!(
        patient_id,
        ws_url = %ws_url,
        interval_secs,
        "Starting wardwatch-wearable",
    );

    let mut generator = ReadingGenerator::from_os_rng();
    sender::run(&ws_url, patient_id, Duration::from_secs(interval_secs), &mut generator).await;
}
