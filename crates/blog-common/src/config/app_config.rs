//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use blog_core::{PopularityWeights, SnowflakeGenerator};
use chrono::Duration;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// User-agent substrings treated as automated clients (matched case-insensitively)
pub const DEFAULT_BOT_SIGNATURES: &[&str] = &[
    "bot",
    "spider",
    "crawl",
    "slurp",
    "curl",
    "wget",
    "python-requests",
    "python-urllib",
    "go-http-client",
    "java/",
    "okhttp",
    "libwww-perl",
    "httpclient",
    "headless",
    "axios",
    "node-fetch",
    "scrapy",
    "postman",
];

/// Longest accepted retention (and so window) setting: one leap year
pub const MAX_VIEW_RETENTION_SECS: u64 = 366 * 86_400;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub engagement: EngagementConfig,
    pub worker: WorkerConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration (view event store)
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Thresholds for view authenticity and popularity scoring
#[derive(Debug, Clone, Deserialize)]
pub struct EngagementConfig {
    /// How long a view event counts for dedup/velocity before it expires
    #[serde(default = "default_view_retention_secs")]
    pub view_retention_secs: u64,
    #[serde(default = "default_velocity_window_secs")]
    pub velocity_window_secs: u64,
    /// Max views from one IP (any target) inside the velocity window
    #[serde(default = "default_velocity_limit")]
    pub velocity_limit: i64,
    #[serde(default = "default_rotation_window_secs")]
    pub rotation_window_secs: u64,
    /// Max distinct IPs per user inside the rotation window
    #[serde(default = "default_rotation_limit")]
    pub rotation_limit: i64,
    #[serde(default = "default_bot_signatures")]
    pub bot_signatures: Vec<String>,
    #[serde(default)]
    pub popularity: PopularityWeights,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            view_retention_secs: default_view_retention_secs(),
            velocity_window_secs: default_velocity_window_secs(),
            velocity_limit: default_velocity_limit(),
            rotation_window_secs: default_rotation_window_secs(),
            rotation_limit: default_rotation_limit(),
            bot_signatures: default_bot_signatures(),
            popularity: PopularityWeights::default(),
        }
    }
}

impl EngagementConfig {
    #[must_use]
    pub fn view_retention(&self) -> Duration {
        secs(self.view_retention_secs)
    }

    #[must_use]
    pub fn velocity_window(&self) -> Duration {
        secs(self.velocity_window_secs)
    }

    #[must_use]
    pub fn rotation_window(&self) -> Duration {
        secs(self.rotation_window_secs)
    }

    /// Reject settings the view pipeline cannot honor.
    ///
    /// Windows must fit inside the retention period, since expired events are
    /// invisible to the velocity and rotation queries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view_retention_secs == 0 || self.view_retention_secs > MAX_VIEW_RETENTION_SECS {
            return Err(ConfigError::InvalidValue(
                "ENGAGEMENT_VIEW_RETENTION_SECS",
                format!("must be in 1..={MAX_VIEW_RETENTION_SECS}"),
            ));
        }
        if self.velocity_window_secs == 0 || self.velocity_window_secs > self.view_retention_secs
        {
            return Err(ConfigError::InvalidValue(
                "ENGAGEMENT_VELOCITY_WINDOW_SECS",
                format!("must be in 1..={}", self.view_retention_secs),
            ));
        }
        if self.rotation_window_secs == 0 || self.rotation_window_secs > self.view_retention_secs
        {
            return Err(ConfigError::InvalidValue(
                "ENGAGEMENT_ROTATION_WINDOW_SECS",
                format!("must be in 1..={}", self.view_retention_secs),
            ));
        }
        if self.velocity_limit < 1 {
            return Err(ConfigError::InvalidValue(
                "ENGAGEMENT_VELOCITY_LIMIT",
                self.velocity_limit.to_string(),
            ));
        }
        if self.rotation_limit < 1 {
            return Err(ConfigError::InvalidValue(
                "ENGAGEMENT_ROTATION_LIMIT",
                self.rotation_limit.to_string(),
            ));
        }
        Ok(())
    }
}

/// Background reconciliation worker settings
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_reconcile_interval_secs")]
    pub reconcile_interval_secs: u64,
    #[serde(default = "default_reconcile_batch_size")]
    pub reconcile_batch_size: i64,
    /// Hard-purge soft-deleted reactions older than this; disabled when `None`
    #[serde(default)]
    pub purge_deleted_reactions_after_days: Option<u32>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: default_reconcile_interval_secs(),
            reconcile_batch_size: default_reconcile_batch_size(),
            purge_deleted_reactions_after_days: None,
        }
    }
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

impl SnowflakeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_id > SnowflakeGenerator::MAX_WORKER_ID {
            return Err(ConfigError::InvalidValue(
                "WORKER_ID",
                format!(
                    "{} (must be in 0..={})",
                    self.worker_id,
                    SnowflakeGenerator::MAX_WORKER_ID
                ),
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_app_name() -> String {
    "blog-engagement".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_view_retention_secs() -> u64 {
    86_400 // 24 hours
}

fn default_velocity_window_secs() -> u64 {
    300 // 5 minutes
}

fn default_velocity_limit() -> i64 {
    10
}

fn default_rotation_window_secs() -> u64 {
    3_600 // 60 minutes
}

fn default_rotation_limit() -> i64 {
    5
}

fn default_bot_signatures() -> Vec<String> {
    DEFAULT_BOT_SIGNATURES.iter().map(|s| (*s).to_string()).collect()
}

fn default_reconcile_interval_secs() -> u64 {
    300
}

fn default_reconcile_batch_size() -> i64 {
    200
}

/// Clamped to [`MAX_VIEW_RETENTION_SECS`] so unvalidated settings still convert
fn secs(value: u64) -> Duration {
    let clamped = value.min(MAX_VIEW_RETENTION_SECS);
    Duration::seconds(i64::try_from(clamped).unwrap_or_default())
}

/// Parse an optional env var, falling back to `default` when unset or unparsable
fn env_or<T: FromStr>(name: &str, default: fn() -> T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(default)
}

/// Split a comma-separated signature list into trimmed, lowercased entries
fn parse_signatures(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or the
    /// engagement thresholds are inconsistent
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", default_max_connections),
                min_connections: env_or("DATABASE_MIN_CONNECTIONS", default_min_connections),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL"))?,
                max_connections: env_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections),
            },
            engagement: EngagementConfig::from_env(),
            worker: WorkerConfig {
                reconcile_interval_secs: env_or(
                    "WORKER_RECONCILE_INTERVAL_SECS",
                    default_reconcile_interval_secs,
                ),
                reconcile_batch_size: env_or(
                    "WORKER_RECONCILE_BATCH_SIZE",
                    default_reconcile_batch_size,
                ),
                purge_deleted_reactions_after_days: env::var("WORKER_PURGE_DELETED_REACTIONS_DAYS")
                    .ok()
                    .and_then(|s| s.trim().parse().ok()),
            },
            snowflake: SnowflakeConfig {
                worker_id: env_or("WORKER_ID", || 0),
            },
        };

        config.engagement.validate()?;
        config.snowflake.validate()?;
        Ok(config)
    }
}

impl EngagementConfig {
    /// Load only the engagement section from environment variables
    pub fn from_env() -> Self {
        Self {
            view_retention_secs: env_or(
                "ENGAGEMENT_VIEW_RETENTION_SECS",
                default_view_retention_secs,
            ),
            velocity_window_secs: env_or(
                "ENGAGEMENT_VELOCITY_WINDOW_SECS",
                default_velocity_window_secs,
            ),
            velocity_limit: env_or("ENGAGEMENT_VELOCITY_LIMIT", default_velocity_limit),
            rotation_window_secs: env_or(
                "ENGAGEMENT_ROTATION_WINDOW_SECS",
                default_rotation_window_secs,
            ),
            rotation_limit: env_or("ENGAGEMENT_ROTATION_LIMIT", default_rotation_limit),
            bot_signatures: env::var("ENGAGEMENT_BOT_SIGNATURES")
                .ok()
                .map(|raw| parse_signatures(&raw))
                .filter(|list| !list.is_empty())
                .unwrap_or_else(default_bot_signatures),
            popularity: PopularityWeights {
                view: env_or("POPULARITY_VIEW_WEIGHT", || 1.0),
                like: env_or("POPULARITY_LIKE_WEIGHT", || 3.0),
                dislike: env_or("POPULARITY_DISLIKE_WEIGHT", || 2.0),
                comment: env_or("POPULARITY_COMMENT_WEIGHT", || 2.0),
            },
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
