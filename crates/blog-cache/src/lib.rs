//! # blog-cache
//!
//! Redis layer holding short-lived view events for the view authenticity
//! pipeline.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **View Store**: Per-identity recency markers plus per-IP and per-user
//!   sorted sets, all expiring after the retention window
//!
//! ## Example
//!
//! ```ignore
//! use blog_cache::{RedisPool, RedisPoolConfig, RedisViewStore};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let views = RedisViewStore::from_config(pool, &engagement_config);
//! ```

pub mod pool;
pub mod views;

pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
pub use views::RedisViewStore;
