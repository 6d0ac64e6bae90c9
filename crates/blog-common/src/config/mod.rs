//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, EngagementConfig, Environment,
    RedisConfig, SnowflakeConfig, WorkerConfig, DEFAULT_BOT_SIGNATURES, MAX_VIEW_RETENTION_SECS,
};
