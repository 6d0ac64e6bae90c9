//! Engagement services
//!
//! Each service borrows a [`ServiceContext`] and is cheap to construct per call.

pub mod context;
pub mod error;
pub mod popularity;
pub mod reaction;
pub mod view;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult, SuspicionReason};
pub use popularity::PopularityService;
pub use reaction::ReactionService;
pub use view::{BotFilter, ViewService};
