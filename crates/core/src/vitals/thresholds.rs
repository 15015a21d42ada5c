//! Static threshold table and the vital-sign classifier.
//!
//! Pure logic. Only `heart_rate` and `spo2` carry thresholds; every other
//! measurement type classifies as [`VitalStatus::Normal`]. Bad input never
//! raises an error: anything that is not a number is `Normal` as well, so
//! ingestion is never blocked by a misbehaving sensor.

use serde::Serialize;

use crate::measurement_names::{MEASUREMENT_HEART_RATE, MEASUREMENT_SPO2, UNIT_BPM, UNIT_PERCENT};
use crate::vitals::reading::coerce_value;
use crate::vitals::status::VitalStatus;

/// Threshold bands for one measurement type.
///
/// All comparisons are strict: a value sitting exactly on a bound belongs
/// to the less severe band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VitalThreshold {
    pub measurement_type: &'static str,
    pub unit: &'static str,
    /// Below this is at least a warning.
    pub min: f64,
    /// Above this is at least a warning. `None` means no ceiling.
    pub max: Option<f64>,
    /// Below this is critical.
    pub critical_min: f64,
    /// Above this is critical. `None` means no ceiling.
    pub critical_max: Option<f64>,
}

impl VitalThreshold {
    /// Classify a value against this threshold's bands.
    pub fn classify(&self, value: f64) -> VitalStatus {
        if value.is_nan() {
            return VitalStatus::Normal;
        }

        let above = |bound: Option<f64>| bound.is_some_and(|b| value > b);

        if value < self.critical_min || above(self.critical_max) {
            VitalStatus::Critical
        } else if value < self.min || above(self.max) {
            VitalStatus::Warning
        } else {
            VitalStatus::Normal
        }
    }
}

/// Process-wide threshold table.
pub static THRESHOLD_TABLE: [VitalThreshold; 2] = [
    VitalThreshold {
        measurement_type: MEASUREMENT_HEART_RATE,
        unit: UNIT_BPM,
        min: 60.0,
        max: Some(100.0),
        critical_min: 50.0,
        critical_max: Some(120.0),
    },
    VitalThreshold {
        measurement_type: MEASUREMENT_SPO2,
        unit: UNIT_PERCENT,
        min: 95.0,
        max: None,
        critical_min: 90.0,
        critical_max: None,
    },
];

/// Look up the threshold bands for a measurement type.
pub fn threshold_for(measurement_type: &str) -> Option<&'static VitalThreshold> {
    THRESHOLD_TABLE
        .iter()
        .find(|t| t.measurement_type == measurement_type)
}

/// Classify a numeric reading.
///
/// | Input                                 | Status   |
/// |---------------------------------------|----------|
/// | unknown measurement type              | Normal   |
/// | `NaN`                                 | Normal   |
/// | outside `critical_min..=critical_max` | Critical |
/// | outside `min..=max`                   | Warning  |
/// | otherwise                             | Normal   |
pub fn classify(measurement_type: &str, value: f64) -> VitalStatus {
    match threshold_for(measurement_type) {
        Some(threshold) => threshold.classify(value),
        None => VitalStatus::Normal,
    }
}

/// Classify a raw JSON value, coercing numeric strings first.
///
/// Values that do not coerce to a finite number classify as `Normal`.
pub fn classify_value(measurement_type: &str, raw: &serde_json::Value) -> VitalStatus {
    coerce_value(raw).map_or(VitalStatus::Normal, |v| classify(measurement_type, v))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
