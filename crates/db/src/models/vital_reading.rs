//! Wearable reading entity model.

use serde::Serialize;
use sqlx::FromRow;
use wardwatch_core::types::{DbId, Timestamp};
use wardwatch_core::vitals::VitalStatus;

/// A stored, classified wearable reading (append-only).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VitalReading {
    pub id: DbId,
    pub patient_id: DbId,
    pub session_id: Option<DbId>,
    pub measurement_type: String,
    pub value: Option<f64>,
    pub unit: String,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: VitalStatus,
    pub measured_at: Timestamp,
    pub created_at: Timestamp,
}
