//! Handlers for wearable vitals ingestion (`/vitals`) and patient history.
//!
//! Recording a reading classifies and timestamps it, stores it, and
//! publishes the stored row on the broadcast relay so live dashboards see it
//! without polling.

use axum::extract::ws::Message;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use wardwatch_core::error::CoreError;
use wardwatch_core::types::DbId;
use wardwatch_core::vitals::{
    classify_value, coerce_value, prepare_reading, ReadingInput, VitalStatus, VitalThreshold,
    THRESHOLD_TABLE,
};
use wardwatch_db::models::vital_reading::VitalReading;
use wardwatch_db::repositories::{MonitoringSessionRepo, VitalReadingRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Default and maximum history window for patient vitals.
const DEFAULT_HISTORY_HOURS: i64 = 24;
const MAX_HISTORY_HOURS: i64 = 168;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for the patient vitals history endpoint.
#[derive(Debug, Deserialize)]
pub struct VitalsHistoryQuery {
    /// How many hours of history to return (default: 24).
    pub hours: Option<i64>,
    /// Restrict to a single measurement type.
    pub measurement_type: Option<String>,
}

/// Request body for the classify endpoint.
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub measurement_type: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Result of classifying a value without storing it.
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub measurement_type: String,
    /// `None` when the value did not coerce to a number.
    pub value: Option<f64>,
    pub status: VitalStatus,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /vitals/thresholds
pub async fn list_thresholds() -> Json<DataResponse<&'static [VitalThreshold]>> {
    Json(DataResponse {
        data: &THRESHOLD_TABLE[..],
    })
}

/// POST /vitals/classify
pub async fn classify_reading(
    Json(input): Json<ClassifyRequest>,
) -> Json<DataResponse<ClassifyResponse>> {
    let status = classify_value(&input.measurement_type, &input.value);
    Json(DataResponse {
        data: ClassifyResponse {
            value: coerce_value(&input.value),
            measurement_type: input.measurement_type,
            status,
        },
    })
}

/// POST /vitals
///
/// Classify, timestamp and store a reading, then publish it to relay clients.
pub async fn record_vital(
    State(state): State<AppState>,
    Json(input): Json<ReadingInput>,
) -> AppResult<(StatusCode, Json<DataResponse<VitalReading>>)> {
    let reading = prepare_reading(input, Utc::now())?;

    if let Some(session_id) = reading.session_id {
        let session = MonitoringSessionRepo::find_by_id(&state.pool, session_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "monitoring_session",
                id: session_id,
            })?;
        if session.patient_id != reading.patient_id {
            return Err(AppError::Core(CoreError::Validation(format!(
                "monitoring_session {session_id} belongs to another patient"
            ))));
        }
        if !session.is_open() {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "monitoring_session {session_id} has already ended"
            ))));
        }
    }

    let stored = VitalReadingRepo::record(&state.pool, &reading).await?;

    if stored.status.is_anomalous() {
        tracing::warn!(
            reading_id = stored.id,
            patient_id = stored.patient_id,
            measurement_type = %stored.measurement_type,
            value = ?stored.value,
            status = %stored.status,
            "Abnormal vital recorded"
        );
    }

    publish_reading(&state, &stored).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: stored })))
}

/// GET /patients/{id}/vitals
pub async fn list_patient_vitals(
    State(state): State<AppState>,
    Path(patient_id): Path<DbId>,
    Query(query): Query<VitalsHistoryQuery>,
) -> AppResult<Json<DataResponse<Vec<VitalReading>>>> {
    let hours = query.hours.unwrap_or(DEFAULT_HISTORY_HOURS);
    if !(1..=MAX_HISTORY_HOURS).contains(&hours) {
        return Err(AppError::BadRequest(format!(
            "hours must be between 1 and {MAX_HISTORY_HOURS}"
        )));
    }
    let since = Utc::now() - Duration::hours(hours);
    let readings = VitalReadingRepo::list_for_patient(
        &state.pool,
        patient_id,
        since,
        query.measurement_type.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse { data: readings }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Send a stored reading to every relay client as a JSON text frame.
///
/// Publishing is best-effort: the reading is already stored, so a
/// serialization failure is logged and swallowed.
async fn publish_reading(state: &AppState, reading: &VitalReading) {
    match serde_json::to_string(reading) {
        Ok(json) => {
            state.ws_manager.broadcast(Message::Text(json.into())).await;
        }
        Err(e) => {
            tracing::warn!(
                reading_id = reading.id,
                error = %e,
                "Failed to serialize reading for relay"
            );
        }
    }
}
