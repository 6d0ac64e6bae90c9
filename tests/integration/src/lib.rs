//! Integration test utilities for the engagement engine
//!
//! In-memory implementations of every store trait plus a manually driven
//! clock, so the full service stack runs without PostgreSQL or Redis.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
