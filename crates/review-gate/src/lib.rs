//! Review gate for the scholarship platform: field validation rules, per-item review
//! status, aggregate readiness, and the session state machine that consumes it.

pub mod config;
pub mod error;
pub mod review;
pub mod telemetry;
