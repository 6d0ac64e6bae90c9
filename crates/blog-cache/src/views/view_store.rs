//! Redis implementation of `ViewRepository`.
//!
//! Three key families, each expiring after the retention window:
//!
//! - `views:seen:{target}:{identity}` holds the last accepted view time (ms)
//! - `views:ip:{ip}` sorted set of views and non-counted attempts from one
//!   IP, scored by time
//! - `views:user_ips:{user}` sorted set of IPs a user viewed from, scored by
//!   the last time each IP was seen
//!
//! Every insert runs in one MULTI/EXEC so readers never see a half-written event.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::AsyncCommands;
use tracing::instrument;

use blog_common::EngagementConfig;
use blog_core::entities::{ViewEvent, ViewIdentity};
use blog_core::error::DomainError;
use blog_core::traits::{RepoResult, ViewRepository};
use blog_core::value_objects::Snowflake;

use crate::pool::{RedisPool, RedisPoolError};

const SEEN_PREFIX: &str = "views:seen:";
const IP_PREFIX: &str = "views:ip:";
const USER_IPS_PREFIX: &str = "views:user_ips:";

fn map_cache_error(e: impl Into<RedisPoolError>) -> DomainError {
    DomainError::CacheError(e.into().to_string())
}

/// View event store backed by Redis
#[derive(Clone)]
pub struct RedisViewStore {
    pool: RedisPool,
    retention: Duration,
}

impl RedisViewStore {
    #[must_use]
    pub fn new(pool: RedisPool, retention: Duration) -> Self {
        Self { pool, retention }
    }

    #[must_use]
    pub fn from_config(pool: RedisPool, config: &EngagementConfig) -> Self {
        Self::new(pool, config.view_retention())
    }

    fn seen_key(target_id: Snowflake, identity: &ViewIdentity) -> String {
        format!("{SEEN_PREFIX}{target_id}:{}", identity.key())
    }

    fn ip_key(ip_address: &str) -> String {
        format!("{IP_PREFIX}{ip_address}")
    }

    fn user_ips_key(user_id: Snowflake) -> String {
        format!("{USER_IPS_PREFIX}{user_id}")
    }

    /// Member for the per-IP set; unique per (target, identity, instant)
    fn ip_member(event: &ViewEvent) -> String {
        format!(
            "{}:{}:{}",
            event.target_id,
            event.identity().key(),
            event.viewed_at.timestamp_millis()
        )
    }

    /// Attempts share the per-IP set; the suffix keeps them apart from views
    fn attempt_member(event: &ViewEvent) -> String {
        let nanos = event
            .viewed_at
            .timestamp_nanos_opt()
            .unwrap_or_else(|| event.viewed_at.timestamp_micros());
        format!("{}:a{nanos}", Self::ip_member(event))
    }

    fn cutoff_ms(&self, at: DateTime<Utc>) -> i64 {
        at.checked_sub_signed(self.retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
            .timestamp_millis()
    }

    fn ttl_secs(&self) -> u64 {
        u64::try_from(self.retention.num_seconds()).unwrap_or(0).max(1)
    }
}

#[async_trait]
impl ViewRepository for RedisViewStore {
    #[instrument(skip(self))]
    async fn exists(
        &self,
        identity: &ViewIdentity,
        target_id: Snowflake,
        since: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let mut conn = self.pool.get().await.map_err(map_cache_error)?;
        let last_seen: Option<i64> = conn
            .get(Self::seen_key(target_id, identity))
            .await
            .map_err(map_cache_error)?;

        Ok(last_seen.is_some_and(|ms| ms >= since.timestamp_millis()))
    }

    #[instrument(skip(self))]
    async fn count_by_ip(&self, ip_address: &str, since: DateTime<Utc>) -> RepoResult<i64> {
        let mut conn = self.pool.get().await.map_err(map_cache_error)?;
        let count: i64 = conn
            .zcount(Self::ip_key(ip_address), since.timestamp_millis(), "+inf")
            .await
            .map_err(map_cache_error)?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn count_distinct_ips_for_user(
        &self,
        user_id: Snowflake,
        since: DateTime<Utc>,
    ) -> RepoResult<i64> {
        let mut conn = self.pool.get().await.map_err(map_cache_error)?;
        let count: i64 = conn
            .zcount(Self::user_ips_key(user_id), since.timestamp_millis(), "+inf")
            .await
            .map_err(map_cache_error)?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn user_has_ip(
        &self,
        user_id: Snowflake,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let mut conn = self.pool.get().await.map_err(map_cache_error)?;
        let last_seen: Option<f64> = conn
            .zscore(Self::user_ips_key(user_id), ip_address)
            .await
            .map_err(map_cache_error)?;

        let cutoff = since.timestamp_millis() as f64;
        Ok(last_seen.is_some_and(|ms| ms >= cutoff))
    }

    #[instrument(skip(self, event), fields(target_id = %event.target_id))]
    async fn insert(&self, event: &ViewEvent) -> RepoResult<()> {
        let now_ms = event.viewed_at.timestamp_millis();
        let cutoff_ms = self.cutoff_ms(event.viewed_at);
        let ttl = self.ttl_secs();
        let ttl_i64 = i64::try_from(ttl).unwrap_or(i64::MAX);

        let mut pipe = redis::pipe();
        pipe.atomic()
            .set_ex(Self::seen_key(event.target_id, &event.identity()), now_ms, ttl)
            .ignore();

        // Signed-in viewers may arrive without an IP; nothing to track then
        if !event.ip_address.is_empty() {
            let ip_key = Self::ip_key(&event.ip_address);
            pipe.zadd(&ip_key, Self::ip_member(event), now_ms)
                .ignore()
                .zrembyscore(&ip_key, "-inf", format!("({cutoff_ms}"))
                .ignore()
                .expire(&ip_key, ttl_i64)
                .ignore();

            if let Some(user_id) = event.user_id {
                let user_key = Self::user_ips_key(user_id);
                pipe.zadd(&user_key, &event.ip_address, now_ms)
                    .ignore()
                    .zrembyscore(&user_key, "-inf", format!("({cutoff_ms}"))
                    .ignore()
                    .expire(&user_key, ttl_i64)
                    .ignore();
            }
        }

        let mut conn = self.pool.get().await.map_err(map_cache_error)?;
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(map_cache_error)?;

        tracing::debug!(
            target_id = %event.target_id,
            identity = %event.identity(),
            "Recorded view event"
        );

        Ok(())
    }

    #[instrument(skip(self, event), fields(target_id = %event.target_id))]
    async fn record_attempt(&self, event: &ViewEvent) -> RepoResult<()> {
        if event.ip_address.is_empty() {
            return Ok(());
        }

        let now_ms = event.viewed_at.timestamp_millis();
        let cutoff_ms = self.cutoff_ms(event.viewed_at);
        let ttl = i64::try_from(self.ttl_secs()).unwrap_or(i64::MAX);
        let ip_key = Self::ip_key(&event.ip_address);

        let mut pipe = redis::pipe();
        pipe.atomic()
            .zadd(&ip_key, Self::attempt_member(event), now_ms)
            .ignore()
            .zrembyscore(&ip_key, "-inf", format!("({cutoff_ms}"))
            .ignore()
            .expire(&ip_key, ttl)
            .ignore();

        let mut conn = self.pool.get().await.map_err(map_cache_error)?;
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(map_cache_error)?;

        Ok(())
    }
}
