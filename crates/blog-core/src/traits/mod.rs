//! Ports - traits the engine needs from its collaborators

mod clock;
mod repositories;

pub use clock::{Clock, SystemClock};
pub use repositories::{ContentRepository, ReactionRepository, RepoResult, ViewRepository};
