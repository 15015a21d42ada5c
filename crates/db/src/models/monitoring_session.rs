//! Monitoring session models and the session summary aggregate.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wardwatch_core::types::{DbId, Timestamp};

/// A bounded window of continuous monitoring for one patient.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MonitoringSession {
    pub id: DbId,
    pub patient_id: DbId,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MonitoringSession {
    /// A session accepts readings until it is ended.
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// DTO for starting a monitoring session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMonitoringSession {
    pub patient_id: DbId,
    pub notes: Option<String>,
}

/// Aggregate statistics over every reading recorded for a session.
///
/// Statistic fields are `None` when the session holds no numeric readings
/// of that measurement type.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionSummary {
    pub session_id: DbId,
    pub reading_count: i64,
    pub avg_heart_rate: Option<f64>,
    pub min_heart_rate: Option<f64>,
    pub max_heart_rate: Option<f64>,
    pub avg_spo2: Option<f64>,
    pub min_spo2: Option<f64>,
    pub max_spo2: Option<f64>,
    /// True if any reading in the session classified as warning or critical.
    pub has_anomaly: bool,
}
