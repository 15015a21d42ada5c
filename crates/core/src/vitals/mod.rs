//! Wearable vitals domain logic.
//!
//! Contains the clinical status levels, the static threshold table with
//! its classifier, and reading preparation for the ingestion path.
//! All logic in this module is pure (no DB access).

pub mod reading;
pub mod status;
pub mod thresholds;

pub use reading::{coerce_value, prepare_reading, ClassifiedReading, ReadingInput};
pub use status::VitalStatus;
pub use thresholds::{classify, classify_value, threshold_for, VitalThreshold, THRESHOLD_TABLE};
