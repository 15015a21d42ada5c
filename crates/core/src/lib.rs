//! Pure domain logic for WardWatch.
//!
//! Nothing in this crate touches the network or the database, so every
//! module can be unit-tested in isolation.

pub mod error;
pub mod measurement_names;
pub mod types;
pub mod vitals;
