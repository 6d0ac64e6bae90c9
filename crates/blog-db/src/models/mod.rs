//! Database models - SQLx-compatible structs for PostgreSQL tables

mod content;
mod reaction;

pub use content::ContentCountersModel;
pub use reaction::{ReactionModel, UpsertedReactionModel};
