//! View event storage in Redis.

mod view_store;

pub use view_store::RedisViewStore;
