//! # blog-core
//!
//! Domain layer for the engagement engine: content counters, reactions, view events,
//! and the store traits the engine depends on.
//! This crate has zero dependencies on infrastructure (database, cache, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    ContentItem, ContentPatch, CounterField, EngagementCounters, Reaction, ReactionCounts,
    ReactionState, ReactionTransition, ReactionType, TargetType, ViewEvent, ViewIdentity,
};
pub use error::DomainError;
pub use traits::{
    Clock, ContentRepository, ReactionRepository, RepoResult, SystemClock, ViewRepository,
};
pub use value_objects::{PopularityWeights, Snowflake, SnowflakeGenerator};
