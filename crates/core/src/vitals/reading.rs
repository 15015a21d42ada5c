//! Reading preparation for the ingestion path.
//!
//! Every reading handed to storage must be classified and timestamped.
//! [`prepare_reading`] enforces that: it validates identifiers, coerces the
//! raw value, fills in the unit and timestamp, and attaches a status.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::measurement_names::{MAX_MEASUREMENT_TYPE_LEN, MAX_UNIT_LEN};
use crate::types::{DbId, Timestamp};
use crate::vitals::status::VitalStatus;
use crate::vitals::thresholds::{classify, threshold_for};

/// A reading as submitted by a producer, before classification.
///
/// `value` stays a raw JSON value so wearables that send numeric strings
/// (or garbage) are still accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadingInput {
    pub patient_id: DbId,
    #[serde(default)]
    pub session_id: Option<DbId>,
    pub measurement_type: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub measured_at: Option<Timestamp>,
}

/// A reading that is ready for storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedReading {
    pub patient_id: DbId,
    pub session_id: Option<DbId>,
    pub measurement_type: String,
    /// `None` when the submitted value did not coerce to a finite number.
    pub value: Option<f64>,
    pub unit: String,
    pub status: VitalStatus,
    pub measured_at: Timestamp,
}

/// Coerce a raw JSON value to a finite `f64`.
///
/// Accepts JSON numbers and numeric strings (surrounding whitespace is
/// ignored). `NaN` and infinities are rejected, including numeric strings
/// that overflow `f64` such as `"1e400"`: those are stored without a value
/// and classified `normal`, like any other unusable input.
pub fn coerce_value(raw: &serde_json::Value) -> Option<f64> {
    let value = match raw {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Validate, classify and timestamp a submitted reading.
///
/// `now` is used when the producer did not supply `measured_at`. The unit
/// defaults to the threshold table's unit for known measurement types.
pub fn prepare_reading(
    input: ReadingInput,
    now: Timestamp,
) -> Result<ClassifiedReading, CoreError> {
    if input.patient_id <= 0 {
        return Err(CoreError::Validation(
            "patient_id must be a positive integer".to_string(),
        ));
    }

    let measurement_type = input.measurement_type.trim().to_string();
    if measurement_type.is_empty() {
        return Err(CoreError::Validation(
            "measurement_type is required".to_string(),
        ));
    }
    if measurement_type.len() > MAX_MEASUREMENT_TYPE_LEN {
        return Err(CoreError::Validation(format!(
            "measurement_type must be at most {MAX_MEASUREMENT_TYPE_LEN} characters"
        )));
    }

    let unit = match input.unit.map(|u| u.trim().to_string()) {
        Some(u) if !u.is_empty() => u,
        _ => threshold_for(&measurement_type)
            .map(|t| t.unit.to_string())
            .unwrap_or_default(),
    };
    if unit.len() > MAX_UNIT_LEN {
        return Err(CoreError::Validation(format!(
            "unit must be at most {MAX_UNIT_LEN} characters"
        )));
    }

    let value = coerce_value(&input.value);
    let status = value.map_or(VitalStatus::Normal, |v| classify(&measurement_type, v));

    Ok(ClassifiedReading {
        patient_id: input.patient_id,
        session_id: input.session_id,
        measurement_type,
        value,
        unit,
        status,
        measured_at: input.measured_at.unwrap_or(now),
    })
}
