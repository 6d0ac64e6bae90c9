//! Domain entities - engagement objects

mod content;
mod reaction;
mod view;

pub use content::{ContentItem, ContentPatch, CounterField, EngagementCounters};
pub use reaction::{
    Reaction, ReactionCounts, ReactionState, ReactionTransition, ReactionType, TargetType,
};
pub use view::{ViewEvent, ViewIdentity};
