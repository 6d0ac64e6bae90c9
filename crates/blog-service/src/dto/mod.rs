//! Data transfer objects for service inputs and outcomes

pub mod requests;
pub mod responses;

pub use requests::TrackViewRequest;
pub use responses::{IgnoreReason, ReconcileReport, ViewOutcome};
