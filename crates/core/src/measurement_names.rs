//! Well-known measurement type names and units.
//!
//! These are the canonical `measurement_type` strings used in the
//! `vital_readings` table, the threshold table, and the JSON envelope
//! wearables push through the relay.

/// Heart rate in beats per minute.
pub const MEASUREMENT_HEART_RATE: &str = "heart_rate";

/// Peripheral oxygen saturation as a percentage.
pub const MEASUREMENT_SPO2: &str = "spo2";

/// Unit reported alongside [`MEASUREMENT_HEART_RATE`].
pub const UNIT_BPM: &str = "bpm";

/// Unit reported alongside [`MEASUREMENT_SPO2`].
pub const UNIT_PERCENT: &str = "%";

/// Maximum accepted length of a `measurement_type` string.
pub const MAX_MEASUREMENT_TYPE_LEN: usize = 64;

/// Maximum accepted length of a `unit` string.
pub const MAX_UNIT_LEN: usize = 16;
