//! Service context - dependency container for services
//!
//! Holds the stores, clock, id generator and engagement thresholds.

use std::sync::Arc;

use blog_cache::{RedisPool, RedisViewStore};
use blog_common::EngagementConfig;
use blog_core::traits::{Clock, ContentRepository, ReactionRepository, SystemClock, ViewRepository};
use blog_core::{Snowflake, SnowflakeGenerator};
use blog_db::{PgContentRepository, PgPool, PgReactionRepository};

use super::error::{ServiceError, ServiceResult};
use super::view::BotFilter;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Stores
    content_repo: Arc<dyn ContentRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    view_repo: Arc<dyn ViewRepository>,

    clock: Arc<dyn Clock>,
    snowflake_generator: Arc<SnowflakeGenerator>,

    engagement: Arc<EngagementConfig>,
    bot_filter: Arc<BotFilter>,
}

impl ServiceContext {
    pub fn new(
        content_repo: Arc<dyn ContentRepository>,
        reaction_repo: Arc<dyn ReactionRepository>,
        view_repo: Arc<dyn ViewRepository>,
        clock: Arc<dyn Clock>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        engagement: EngagementConfig,
    ) -> Self {
        let bot_filter = Arc::new(BotFilter::new(&engagement.bot_signatures));
        Self {
            content_repo,
            reaction_repo,
            view_repo,
            clock,
            snowflake_generator,
            engagement: Arc::new(engagement),
            bot_filter,
        }
    }

    /// Wire the Postgres and Redis stores
    pub fn with_stores(
        pool: PgPool,
        redis_pool: RedisPool,
        engagement: EngagementConfig,
        snowflake_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        let view_repo = RedisViewStore::from_config(redis_pool, &engagement);
        Self::new(
            Arc::new(PgContentRepository::new(pool.clone())),
            Arc::new(PgReactionRepository::new(pool)),
            Arc::new(view_repo),
            Arc::new(SystemClock),
            snowflake_generator,
            engagement,
        )
    }

    // === Stores ===

    pub fn content_repo(&self) -> &dyn ContentRepository {
        self.content_repo.as_ref()
    }

    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    pub fn view_repo(&self) -> &dyn ViewRepository {
        self.view_repo.as_ref()
    }

    // === Runtime ===

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn engagement(&self) -> &EngagementConfig {
        &self.engagement
    }

    pub fn bot_filter(&self) -> &BotFilter {
        &self.bot_filter
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("worker_id", &self.snowflake_generator.worker_id())
            .field("engagement", &self.engagement)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom collaborators
///
/// Stores are required. The clock defaults to [`SystemClock`], the generator
/// to worker 0 and thresholds to [`EngagementConfig::default`].
#[derive(Default)]
pub struct ServiceContextBuilder {
    content_repo: Option<Arc<dyn ContentRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    view_repo: Option<Arc<dyn ViewRepository>>,
    clock: Option<Arc<dyn Clock>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    engagement: Option<EngagementConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_repo(mut self, repo: Arc<dyn ContentRepository>) -> Self {
        self.content_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn view_repo(mut self, repo: Arc<dyn ViewRepository>) -> Self {
        self.view_repo = Some(repo);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn engagement(mut self, config: EngagementConfig) -> Self {
        self.engagement = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::InvalidArgument` if a store is missing or the
    /// thresholds are inconsistent
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let engagement = self.engagement.unwrap_or_default();
        engagement
            .validate()
            .map_err(|e| ServiceError::invalid_argument(e.to_string()))?;

        Ok(ServiceContext::new(
            self.content_repo
                .ok_or_else(|| ServiceError::invalid_argument("content_repo is required"))?,
            self.reaction_repo
                .ok_or_else(|| ServiceError::invalid_argument("reaction_repo is required"))?,
            self.view_repo
                .ok_or_else(|| ServiceError::invalid_argument("view_repo is required"))?,
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            engagement,
        ))
    }
}
