//! Repository for the `monitoring_sessions` table and session summaries.

use sqlx::PgPool;
use wardwatch_core::measurement_names::{MEASUREMENT_HEART_RATE, MEASUREMENT_SPO2};
use wardwatch_core::types::{DbId, Timestamp};
use wardwatch_core::vitals::VitalStatus;

use crate::models::monitoring_session::{
    CreateMonitoringSession, MonitoringSession, SessionSummary,
};

/// Column list for `monitoring_sessions` SELECT queries.
const COLUMNS: &str = "id, patient_id, started_at, ended_at, notes, created_at, updated_at";

/// Provides query operations for monitoring sessions.
pub struct MonitoringSessionRepo;

impl MonitoringSessionRepo {
    /// Start a new session, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMonitoringSession,
    ) -> Result<MonitoringSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO monitoring_sessions (patient_id, notes) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MonitoringSession>(&query)
            .bind(input.patient_id)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a session by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MonitoringSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM monitoring_sessions WHERE id = $1");
        sqlx::query_as::<_, MonitoringSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a patient's sessions, most recent first.
    pub async fn list_by_patient(
        pool: &PgPool,
        patient_id: DbId,
    ) -> Result<Vec<MonitoringSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM monitoring_sessions \
             WHERE patient_id = $1 \
             ORDER BY started_at DESC, id DESC"
        );
        sqlx::query_as::<_, MonitoringSession>(&query)
            .bind(patient_id)
            .fetch_all(pool)
            .await
    }

    /// End an open session.
    ///
    /// Returns `None` if the session does not exist or was already ended.
    pub async fn end(
        pool: &PgPool,
        id: DbId,
        ended_at: Timestamp,
    ) -> Result<Option<MonitoringSession>, sqlx::Error> {
        let query = format!(
            "UPDATE monitoring_sessions SET ended_at = GREATEST($2, started_at) \
             WHERE id = $1 AND ended_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MonitoringSession>(&query)
            .bind(id)
            .bind(ended_at)
            .fetch_optional(pool)
            .await
    }

    /// Compute heart-rate and SpO2 statistics over a session's readings.
    ///
    /// Readings stored without a numeric value are counted but do not
    /// contribute to averages or extremes.
    pub async fn summarize(pool: &PgPool, session_id: DbId) -> Result<SessionSummary, sqlx::Error> {
        let query = "\
            SELECT \
                $1::BIGINT AS session_id, \
                COUNT(*) AS reading_count, \
                AVG(value) FILTER (WHERE measurement_type = $2) AS avg_heart_rate, \
                MIN(value) FILTER (WHERE measurement_type = $2) AS min_heart_rate, \
                MAX(value) FILTER (WHERE measurement_type = $2) AS max_heart_rate, \
                AVG(value) FILTER (WHERE measurement_type = $3) AS avg_spo2, \
                MIN(value) FILTER (WHERE measurement_type = $3) AS min_spo2, \
                MAX(value) FILTER (WHERE measurement_type = $3) AS max_spo2, \
                COALESCE(BOOL_OR(status_id <> $4), FALSE) AS has_anomaly \
            FROM vital_readings \
            WHERE session_id = $1";
        let summary = sqlx::query_as::<_, SessionSummary>(query)
            .bind(session_id)
            .bind(MEASUREMENT_HEART_RATE)
            .bind(MEASUREMENT_SPO2)
            .bind(VitalStatus::Normal.id())
            .fetch_one(pool)
            .await?;

        tracing::debug!(
            session_id,
            reading_count = summary.reading_count,
            has_anomaly = summary.has_anomaly,
            "Session summary computed"
        );
        Ok(summary)
    }
}
