//! Repository implementations
//!
//! PostgreSQL implementations of the content and reaction repository traits
//! defined in blog-core.

mod content;
mod error;
mod reaction;

pub use content::PgContentRepository;
pub use reaction::PgReactionRepository;
