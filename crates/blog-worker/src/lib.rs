//! # blog-worker
//!
//! Periodic maintenance for the engagement engine:
//!
//! - reconciliation sweep re-deriving reaction counts and popularity for every post
//! - optional hard purge of long soft-deleted reactions

pub mod jobs;
pub mod setup;

pub use jobs::{CycleReport, MaintenanceJobs};
pub use setup::{create_service_context, run};
