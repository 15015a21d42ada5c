//! Handlers for monitoring sessions and their summaries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use wardwatch_core::error::CoreError;
use wardwatch_core::types::DbId;
use wardwatch_db::models::monitoring_session::{
    CreateMonitoringSession, MonitoringSession, SessionSummary,
};
use wardwatch_db::models::vital_reading::VitalReading;
use wardwatch_db::repositories::{MonitoringSessionRepo, VitalReadingRepo};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /monitoring-sessions
pub async fn start_session(
    State(state): State<AppState>,
    Json(input): Json<CreateMonitoringSession>,
) -> AppResult<(StatusCode, Json<DataResponse<MonitoringSession>>)> {
    if input.patient_id <= 0 {
        return Err(
            CoreError::Validation("patient_id must be a positive integer".to_string()).into(),
        );
    }

    let session = MonitoringSessionRepo::create(&state.pool, &input).await?;
    tracing::info!(
        session_id = session.id,
        patient_id = session.patient_id,
        "Monitoring session started"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// GET /monitoring-sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MonitoringSession>>> {
    let session = find_session(&state, id).await?;
    Ok(Json(DataResponse { data: session }))
}

/// POST /monitoring-sessions/{id}/end
///
/// Ending a session twice is a conflict.
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MonitoringSession>>> {
    match MonitoringSessionRepo::end(&state.pool, id, Utc::now()).await? {
        Some(session) => {
            tracing::info!(session_id = session.id, "Monitoring session ended");
            Ok(Json(DataResponse { data: session }))
        }
        None => {
            // Distinguish "missing" from "already ended".
            find_session(&state, id).await?;
            Err(CoreError::Conflict(format!("monitoring_session {id} has already ended")).into())
        }
    }
}

/// GET /monitoring-sessions/{id}/summary
pub async fn session_summary(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SessionSummary>>> {
    find_session(&state, id).await?;
    let summary = MonitoringSessionRepo::summarize(&state.pool, id).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /monitoring-sessions/{id}/vitals
///
/// Every reading tied to the session, oldest first.
pub async fn list_session_vitals(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<VitalReading>>>> {
    find_session(&state, id).await?;
    let readings = VitalReadingRepo::list_for_session(&state.pool, id).await?;
    Ok(Json(DataResponse { data: readings }))
}

/// GET /patients/{id}/monitoring-sessions
pub async fn list_patient_sessions(
    State(state): State<AppState>,
    Path(patient_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<MonitoringSession>>>> {
    let sessions = MonitoringSessionRepo::list_by_patient(&state.pool, patient_id).await?;
    Ok(Json(DataResponse { data: sessions }))
}

async fn find_session(state: &AppState, id: DbId) -> AppResult<MonitoringSession> {
    MonitoringSessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "monitoring_session",
                id,
            }
            .into()
        })
}
