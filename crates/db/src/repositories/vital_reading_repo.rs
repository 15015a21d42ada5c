//! Repository for the `vital_readings` table (append-only time-series).

use sqlx::PgPool;
use wardwatch_core::types::{DbId, Timestamp};
use wardwatch_core::vitals::ClassifiedReading;

use crate::models::vital_reading::VitalReading;

/// Column list for `vital_readings` SELECT queries (includes `id` and `created_at`).
const COLUMNS: &str = "\
    id, patient_id, session_id, measurement_type, value, unit, \
    status_id, measured_at, created_at";

/// Column list for `vital_readings` INSERT statements.
///
/// Excludes the generated `id` and `created_at`.
const INSERT_COLUMNS: &str = "\
    patient_id, session_id, measurement_type, value, unit, status_id, measured_at";

/// Provides query operations for wearable readings.
pub struct VitalReadingRepo;

impl VitalReadingRepo {
    /// Store a classified reading and return the stored row.
    pub async fn record(
        pool: &PgPool,
        reading: &ClassifiedReading,
    ) -> Result<VitalReading, sqlx::Error> {
        let query = format!(
            "INSERT INTO vital_readings ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VitalReading>(&query)
            .bind(reading.patient_id)
            .bind(reading.session_id)
            .bind(&reading.measurement_type)
            .bind(reading.value)
            .bind(&reading.unit)
            .bind(reading.status.id())
            .bind(reading.measured_at)
            .fetch_one(pool)
            .await
    }

    /// Get a patient's readings since the given timestamp, newest first.
    ///
    /// When `measurement_type` is set only readings of that type are returned.
    pub async fn list_for_patient(
        pool: &PgPool,
        patient_id: DbId,
        since: Timestamp,
        measurement_type: Option<&str>,
    ) -> Result<Vec<VitalReading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vital_readings \
             WHERE patient_id = $1 AND measured_at >= $2 \
               AND ($3::TEXT IS NULL OR measurement_type = $3) \
             ORDER BY measured_at DESC, id DESC"
        );
        sqlx::query_as::<_, VitalReading>(&query)
            .bind(patient_id)
            .bind(since)
            .bind(measurement_type)
            .fetch_all(pool)
            .await
    }

    /// Get every reading recorded for a session, oldest first.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<VitalReading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vital_readings \
             WHERE session_id = $1 \
             ORDER BY measured_at ASC, id ASC"
        );
        sqlx::query_as::<_, VitalReading>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }
}
