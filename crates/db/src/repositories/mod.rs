//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod monitoring_session_repo;
pub mod vital_reading_repo;

pub use monitoring_session_repo::MonitoringSessionRepo;
pub use vital_reading_repo::VitalReadingRepo;
