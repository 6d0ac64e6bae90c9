//! Test engine wiring the services to in-memory stores

use std::sync::Arc;

use blog_common::EngagementConfig;
use blog_core::traits::Clock;
use blog_core::{Snowflake, SnowflakeGenerator};
use blog_service::{
    PopularityService, ReactionService, ServiceContext, ServiceContextBuilder, TrackViewRequest,
    ViewService,
};

use crate::fixtures::{
    next_id, InMemoryContentStore, InMemoryReactionStore, InMemoryViewStore, ManualClock,
};

/// A desktop browser user agent that no bot signature matches
pub const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// Service context plus direct handles on its stores
pub struct TestEngine {
    pub ctx: ServiceContext,
    pub clock: Arc<ManualClock>,
    pub content: Arc<InMemoryContentStore>,
    pub reactions: Arc<InMemoryReactionStore>,
    pub views: Arc<InMemoryViewStore>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(EngagementConfig::default())
    }

    pub fn with_config(config: EngagementConfig) -> Self {
        let clock = Arc::new(ManualClock::fixed());
        let shared_clock: Arc<dyn Clock> = clock.clone();

        let content = Arc::new(InMemoryContentStore::new());
        let reactions = Arc::new(InMemoryReactionStore::new(shared_clock.clone()));
        let views = Arc::new(InMemoryViewStore::new(
            shared_clock.clone(),
            config.view_retention(),
        ));

        let ctx = ServiceContextBuilder::new()
            .content_repo(content.clone())
            .reaction_repo(reactions.clone())
            .view_repo(views.clone())
            .clock(shared_clock)
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1).unwrap()))
            .engagement(config)
            .build()
            .expect("test engagement config is valid");

        Self {
            ctx,
            clock,
            content,
            reactions,
            views,
        }
    }

    /// Create a live post with zeroed counters
    pub fn create_post(&self) -> Snowflake {
        let id = next_id();
        self.content.insert_post(id);
        id
    }

    pub fn reaction_service(&self) -> ReactionService<'_> {
        ReactionService::new(&self.ctx)
    }

    pub fn view_service(&self) -> ViewService<'_> {
        ViewService::new(&self.ctx)
    }

    pub fn popularity_service(&self) -> PopularityService<'_> {
        PopularityService::new(&self.ctx)
    }

    /// Current view counter of a post
    pub fn view_count(&self, id: Snowflake) -> i64 {
        self.content.get(id).map_or(0, |item| item.view_count)
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Browser view from `ip`, signed in when `user_id` is given
pub fn browser_view(target_id: Snowflake, user_id: Option<Snowflake>, ip: &str) -> TrackViewRequest {
    TrackViewRequest::new(target_id, user_id, ip, BROWSER_UA)
}
