//! Value objects - immutable types that represent domain concepts

mod popularity;
mod snowflake;

pub use popularity::PopularityWeights;
pub use snowflake::{Snowflake, SnowflakeGenerator};
