//! Entity models and DTOs.
//!
//! Models derive `FromRow` for query results; `Create*` DTOs carry the
//! columns an INSERT needs.

pub mod monitoring_session;
pub mod vital_reading;
