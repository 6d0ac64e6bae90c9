//! Repository traits (ports) - define the interface for engagement data access
//!
//! The engine holds no locks of its own. Every guarantee it relies on under
//! concurrency (atomic counters, one reaction row per key) is a contract of the
//! implementations below.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    ContentPatch, CounterField, EngagementCounters, Reaction, ReactionType, TargetType,
    ViewEvent, ViewIdentity,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Content Repository
// ============================================================================

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Current counters, `None` if the item does not exist
    async fn get_counters(&self, id: Snowflake) -> RepoResult<Option<EngagementCounters>>;

    /// Check whether a non-deleted item exists
    async fn exists(&self, id: Snowflake) -> RepoResult<bool>;

    /// Atomically add `delta` to one counter. Must not read-modify-write.
    async fn increment_counter(
        &self,
        id: Snowflake,
        field: CounterField,
        delta: i64,
    ) -> RepoResult<()>;

    /// Overwrite the fields set in `patch`
    async fn patch_fields(&self, id: Snowflake, patch: &ContentPatch) -> RepoResult<()>;

    /// Page through non-deleted ids in ascending order, starting after `after`
    async fn list_ids(&self, after: Option<Snowflake>, limit: i64) -> RepoResult<Vec<Snowflake>>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Atomic upsert keyed by (user, target, target type).
    ///
    /// Always sets the type, clears `is_deleted` and bumps `updated_at`.
    /// `id` and `created_at` are only written when the key is first created.
    /// Returns the stored row and whether it was newly inserted.
    async fn upsert(
        &self,
        id: Snowflake,
        user_id: Snowflake,
        target_id: Snowflake,
        target_type: TargetType,
        reaction_type: ReactionType,
    ) -> RepoResult<(Reaction, bool)>;

    /// Mark an active reaction deleted. `ReactionNotFound` if none was active.
    async fn soft_delete(&self, reaction_id: Snowflake) -> RepoResult<()>;

    /// The active reaction of a user on a target, if any
    async fn find_active(
        &self,
        user_id: Snowflake,
        target_id: Snowflake,
    ) -> RepoResult<Option<Reaction>>;

    /// Count active reactions of one type on a target
    async fn count_by_type(
        &self,
        target_id: Snowflake,
        reaction_type: ReactionType,
    ) -> RepoResult<i64>;

    /// Hard-delete soft-deleted rows last touched before `before`
    async fn purge_deleted(&self, before: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// View Repository
// ============================================================================

/// View event store. Implementations expire events past their retention window
/// on their own; queries never see expired events.
#[async_trait]
pub trait ViewRepository: Send + Sync {
    /// Has `identity` viewed `target_id` at or after `since`?
    async fn exists(
        &self,
        identity: &ViewIdentity,
        target_id: Snowflake,
        since: DateTime<Utc>,
    ) -> RepoResult<bool>;

    /// Views from `ip_address` on any target at or after `since`
    async fn count_by_ip(&self, ip_address: &str, since: DateTime<Utc>) -> RepoResult<i64>;

    /// Distinct IPs `user_id` viewed from at or after `since`
    async fn count_distinct_ips_for_user(
        &self,
        user_id: Snowflake,
        since: DateTime<Utc>,
    ) -> RepoResult<i64>;

    /// Has `user_id` viewed anything from `ip_address` at or after `since`?
    async fn user_has_ip(
        &self,
        user_id: Snowflake,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> RepoResult<bool>;

    /// Record a view event
    async fn insert(&self, event: &ViewEvent) -> RepoResult<()>;

    /// Count a request that did not become a view toward the velocity total
    /// of its IP. Dedup and rotation records are untouched; no-op without an IP.
    async fn record_attempt(&self, event: &ViewEvent) -> RepoResult<()>;
}
