//! Clinical status levels produced by the threshold classifier.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Clinical classification of a single reading.
///
/// Discriminant values match the seeded rows in the `vital_statuses`
/// lookup table (1-based).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitalStatus {
    Normal = 1,
    Warning = 2,
    Critical = 3,
}

impl VitalStatus {
    /// Resolve a database status ID to the corresponding enum variant.
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Normal),
            2 => Some(Self::Warning),
            3 => Some(Self::Critical),
            _ => None,
        }
    }

    /// Return the database status ID.
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Wire name, matching the `name` column in `vital_statuses`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Whether the reading falls outside the normal band.
    pub fn is_anomalous(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl TryFrom<i16> for VitalStatus {
    type Error = CoreError;

    fn try_from(id: i16) -> Result<Self, Self::Error> {
        Self::from_id(id)
            .ok_or_else(|| CoreError::Internal(format!("Unknown vital status id {id}")))
    }
}

impl std::fmt::Display for VitalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
