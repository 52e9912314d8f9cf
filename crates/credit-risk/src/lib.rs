//! Credit risk scoring, banding, pricing, and bureau reconciliation for business borrowers.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
