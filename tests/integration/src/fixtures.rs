//! In-memory stores and a manual clock
//!
//! The stores honor the same atomicity contracts as the Postgres and Redis
//! implementations: counters increment under a per-entry lock, reaction
//! upserts happen under one lock keyed by (user, target, target type), and
//! view events older than the retention window are invisible.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use blog_core::entities::{
    ContentItem, ContentPatch, CounterField, EngagementCounters, Reaction, ReactionType,
    TargetType, ViewEvent, ViewIdentity,
};
use blog_core::traits::{Clock, ContentRepository, ReactionRepository, RepoResult, ViewRepository};
use blog_core::{DomainError, Snowflake};

/// Counter for unique test ids
static COUNTER: AtomicU64 = AtomicU64::new(1_000);

/// A fresh non-zero id
pub fn next_id() -> Snowflake {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    Snowflake::new(i64::try_from(id).unwrap_or(i64::MAX))
}

// ============================================================================
// Clock
// ============================================================================

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// 2025-01-01 00:00:00 UTC
    pub fn fixed() -> Self {
        Self::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
    }

    pub fn advance(&self, by: Duration) {
        *self.now.write() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

// ============================================================================
// Content Store
// ============================================================================

#[derive(Default)]
pub struct InMemoryContentStore {
    items: DashMap<Snowflake, ContentItem>,
    fail_patches: AtomicBool,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_post(&self, id: Snowflake) {
        self.items.insert(id, ContentItem::new(id));
    }

    /// Overwrite counters directly, bypassing the engine (simulates drift)
    pub fn set_counters(&self, id: Snowflake, counters: EngagementCounters) {
        if let Some(mut item) = self.items.get_mut(&id) {
            item.view_count = counters.views;
            item.like_count = counters.likes;
            item.dislike_count = counters.dislikes;
            item.comment_count = counters.comments;
        }
    }

    pub fn get(&self, id: Snowflake) -> Option<ContentItem> {
        self.items.get(&id).map(|item| item.clone())
    }

    fn live(&self, id: Snowflake) -> Option<ContentItem> {
        self.get(id).filter(|item| !item.is_deleted)
    }

    pub fn soft_delete(&self, id: Snowflake) {
        if let Some(mut item) = self.items.get_mut(&id) {
            item.is_deleted = true;
        }
    }

    /// Make every `patch_fields` call fail until switched off
    pub fn fail_patches(&self, fail: bool) {
        self.fail_patches.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentStore {
    async fn get_counters(&self, id: Snowflake) -> RepoResult<Option<EngagementCounters>> {
        Ok(self.live(id).map(|item| item.counters()))
    }

    async fn exists(&self, id: Snowflake) -> RepoResult<bool> {
        Ok(self.live(id).is_some())
    }

    async fn increment_counter(
        &self,
        id: Snowflake,
        field: CounterField,
        delta: i64,
    ) -> RepoResult<()> {
        let mut item = self
            .items
            .get_mut(&id)
            .filter(|item| !item.is_deleted)
            .ok_or(DomainError::ContentNotFound(id))?;

        match field {
            CounterField::Views => item.view_count += delta,
            CounterField::Likes => item.like_count += delta,
            CounterField::Dislikes => item.dislike_count += delta,
            CounterField::Comments => item.comment_count += delta,
        }
        Ok(())
    }

    async fn patch_fields(&self, id: Snowflake, patch: &ContentPatch) -> RepoResult<()> {
        if self.fail_patches.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("injected patch failure".to_string()));
        }

        let mut item = self
            .items
            .get_mut(&id)
            .filter(|item| !item.is_deleted)
            .ok_or(DomainError::ContentNotFound(id))?;
        item.apply(patch);
        Ok(())
    }

    async fn list_ids(&self, after: Option<Snowflake>, limit: i64) -> RepoResult<Vec<Snowflake>> {
        let mut ids: Vec<Snowflake> = self
            .items
            .iter()
            .filter(|entry| !entry.is_deleted && after.map_or(true, |a| *entry.key() > a))
            .map(|entry| *entry.key())
            .collect();
        ids.sort_unstable();
        ids.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(ids)
    }
}

// ============================================================================
// Reaction Store
// ============================================================================

type ReactionKey = (Snowflake, Snowflake, TargetType);

pub struct InMemoryReactionStore {
    rows: Mutex<HashMap<ReactionKey, Reaction>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryReactionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Every stored row (active or not) for a user on a target
    pub fn rows_for(&self, user_id: Snowflake, target_id: Snowflake) -> Vec<Reaction> {
        self.rows
            .lock()
            .values()
            .filter(|r| r.user_id == user_id && r.target_id == target_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReactionRepository for InMemoryReactionStore {
    async fn upsert(
        &self,
        id: Snowflake,
        user_id: Snowflake,
        target_id: Snowflake,
        target_type: TargetType,
        reaction_type: ReactionType,
    ) -> RepoResult<(Reaction, bool)> {
        // Let concurrent callers interleave between read and write
        tokio::task::yield_now().await;

        let now = self.clock.now();
        let mut rows = self.rows.lock();
        match rows.get_mut(&(user_id, target_id, target_type)) {
            Some(existing) => {
                existing.reaction_type = reaction_type;
                existing.is_deleted = false;
                existing.updated_at = now;
                Ok((existing.clone(), false))
            }
            None => {
                let reaction =
                    Reaction::new(id, user_id, target_id, target_type, reaction_type, now);
                rows.insert((user_id, target_id, target_type), reaction.clone());
                Ok((reaction, true))
            }
        }
    }

    async fn soft_delete(&self, reaction_id: Snowflake) -> RepoResult<()> {
        let now = self.clock.now();
        let mut rows = self.rows.lock();
        let row = rows
            .values_mut()
            .find(|r| r.id == reaction_id && r.is_active())
            .ok_or(DomainError::ReactionNotFound(reaction_id))?;
        row.is_deleted = true;
        row.updated_at = now;
        Ok(())
    }

    async fn find_active(
        &self,
        user_id: Snowflake,
        target_id: Snowflake,
    ) -> RepoResult<Option<Reaction>> {
        tokio::task::yield_now().await;

        Ok(self
            .rows
            .lock()
            .values()
            .find(|r| r.user_id == user_id && r.target_id == target_id && r.is_active())
            .cloned())
    }

    async fn count_by_type(
        &self,
        target_id: Snowflake,
        reaction_type: ReactionType,
    ) -> RepoResult<i64> {
        let count = self
            .rows
            .lock()
            .values()
            .filter(|r| r.target_id == target_id && r.reaction_type == reaction_type && r.is_active())
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn purge_deleted(&self, before: DateTime<Utc>) -> RepoResult<u64> {
        let mut rows = self.rows.lock();
        let len_before = rows.len();
        rows.retain(|_, r| !(r.is_deleted && r.updated_at < before));
        Ok((len_before - rows.len()) as u64)
    }
}

// ============================================================================
// View Store
// ============================================================================

pub struct InMemoryViewStore {
    events: RwLock<Vec<ViewEvent>>,
    /// (ip, time) of requests that did not become views
    attempts: RwLock<Vec<(String, DateTime<Utc>)>>,
    clock: Arc<dyn Clock>,
    retention: Duration,
    latency: RwLock<Option<StdDuration>>,
    fail_inserts: AtomicBool,
}

impl InMemoryViewStore {
    pub fn new(clock: Arc<dyn Clock>, retention: Duration) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            attempts: RwLock::new(Vec::new()),
            clock,
            retention,
            latency: RwLock::new(None),
            fail_inserts: AtomicBool::new(false),
        }
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Option<StdDuration>) {
        *self.latency.write() = latency;
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Events still inside the retention window
    pub fn live_events(&self) -> Vec<ViewEvent> {
        let cutoff = self.expiry_cutoff();
        self.events
            .read()
            .iter()
            .filter(|e| e.viewed_at >= cutoff)
            .cloned()
            .collect()
    }

    fn expiry_cutoff(&self) -> DateTime<Utc> {
        self.clock
            .now()
            .checked_sub_signed(self.retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn matching<F>(&self, since: DateTime<Utc>, predicate: F) -> Vec<ViewEvent>
    where
        F: Fn(&ViewEvent) -> bool,
    {
        let since = since.max(self.expiry_cutoff());
        self.events
            .read()
            .iter()
            .filter(|e| e.viewed_at >= since && predicate(e))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ViewRepository for InMemoryViewStore {
    async fn exists(
        &self,
        identity: &ViewIdentity,
        target_id: Snowflake,
        since: DateTime<Utc>,
    ) -> RepoResult<bool> {
        self.simulate_latency().await;
        Ok(!self
            .matching(since, |e| e.target_id == target_id && e.identity() == *identity)
            .is_empty())
    }

    async fn count_by_ip(&self, ip_address: &str, since: DateTime<Utc>) -> RepoResult<i64> {
        self.simulate_latency().await;
        let views = self.matching(since, |e| e.ip_address == ip_address).len();
        let since = since.max(self.expiry_cutoff());
        let attempts = self
            .attempts
            .read()
            .iter()
            .filter(|(ip, at)| ip == ip_address && *at >= since)
            .count();
        Ok(i64::try_from(views + attempts).unwrap_or(i64::MAX))
    }

    async fn count_distinct_ips_for_user(
        &self,
        user_id: Snowflake,
        since: DateTime<Utc>,
    ) -> RepoResult<i64> {
        self.simulate_latency().await;
        let ips: HashSet<String> = self
            .matching(since, |e| e.user_id == Some(user_id) && !e.ip_address.is_empty())
            .into_iter()
            .map(|e| e.ip_address)
            .collect();
        Ok(i64::try_from(ips.len()).unwrap_or(i64::MAX))
    }

    async fn user_has_ip(
        &self,
        user_id: Snowflake,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> RepoResult<bool> {
        self.simulate_latency().await;
        Ok(!self
            .matching(since, |e| e.user_id == Some(user_id) && e.ip_address == ip_address)
            .is_empty())
    }

    async fn insert(&self, event: &ViewEvent) -> RepoResult<()> {
        self.simulate_latency().await;
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::CacheError("injected insert failure".to_string()));
        }

        let cutoff = self.expiry_cutoff();
        let mut events = self.events.write();
        events.retain(|e| e.viewed_at >= cutoff);
        events.push(event.clone());
        Ok(())
    }

    async fn record_attempt(&self, event: &ViewEvent) -> RepoResult<()> {
        self.simulate_latency().await;
        if event.ip_address.is_empty() {
            return Ok(());
        }

        let cutoff = self.expiry_cutoff();
        let mut attempts = self.attempts.write();
        attempts.retain(|(_, at)| *at >= cutoff);
        attempts.push((event.ip_address.clone(), event.viewed_at));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::fixed();
        let start = clock.now();
        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now() - start, Duration::minutes(5));
    }

    #[tokio::test]
    async fn test_view_store_hides_expired_events() {
        let clock = Arc::new(ManualClock::fixed());
        let store = InMemoryViewStore::new(clock.clone(), Duration::hours(1));
        let target = next_id();
        let event = ViewEvent::new(target, None, "1.2.3.4", "ua", clock.now());
        store.insert(&event).await.unwrap();

        let identity = event.identity();
        let epoch = DateTime::<Utc>::MIN_UTC;
        assert!(store.exists(&identity, target, epoch).await.unwrap());

        clock.advance(Duration::hours(2));
        assert!(!store.exists(&identity, target, epoch).await.unwrap());
        assert!(store.live_events().is_empty());
    }

    #[tokio::test]
    async fn test_attempts_count_toward_ip_only() {
        let clock = Arc::new(ManualClock::fixed());
        let store = InMemoryViewStore::new(clock.clone(), Duration::hours(1));
        let user = next_id();
        let event = ViewEvent::new(next_id(), Some(user), "1.2.3.4", "ua", clock.now());
        store.record_attempt(&event).await.unwrap();
        store.record_attempt(&event).await.unwrap();

        let epoch = DateTime::<Utc>::MIN_UTC;
        assert_eq!(store.count_by_ip("1.2.3.4", epoch).await.unwrap(), 2);
        assert!(!store.exists(&event.identity(), event.target_id, epoch).await.unwrap());
        assert_eq!(store.count_distinct_ips_for_user(user, epoch).await.unwrap(), 0);
        assert!(store.live_events().is_empty());

        clock.advance(Duration::hours(2));
        assert_eq!(store.count_by_ip("1.2.3.4", epoch).await.unwrap(), 0);
    }
}
