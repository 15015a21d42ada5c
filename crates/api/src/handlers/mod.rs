//! Axum request handlers, grouped by resource.

pub mod sessions;
pub mod vitals;
