//! Reaction service
//!
//! Like/dislike toggles on posts and comments. The transition table lives in
//! [`ReactionState::toggle`]; this service maps transitions onto store calls
//! and leaves convergence under concurrency to the store's atomic upsert.

use blog_core::entities::{Reaction, ReactionCounts, ReactionState, ReactionTransition, ReactionType, TargetType};
use blog_core::{DomainError, Snowflake};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::popularity::PopularityService;

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Toggle a like; returns the resulting state
    #[instrument(skip(self))]
    pub async fn toggle_like(
        &self,
        user_id: Snowflake,
        target_id: Snowflake,
        target_type: TargetType,
    ) -> ServiceResult<ReactionState> {
        self.toggle(user_id, target_id, target_type, ReactionType::Like)
            .await
    }

    /// Toggle a dislike; returns the resulting state
    #[instrument(skip(self))]
    pub async fn toggle_dislike(
        &self,
        user_id: Snowflake,
        target_id: Snowflake,
        target_type: TargetType,
    ) -> ServiceResult<ReactionState> {
        self.toggle(user_id, target_id, target_type, ReactionType::Dislike)
            .await
    }

    /// The user's active reaction on a target, if any
    #[instrument(skip(self))]
    pub async fn get_user_reaction(
        &self,
        user_id: Snowflake,
        target_id: Snowflake,
    ) -> ServiceResult<Option<Reaction>> {
        require_id(user_id, "user_id")?;
        require_id(target_id, "target_id")?;

        Ok(self.ctx.reaction_repo().find_active(user_id, target_id).await?)
    }

    /// Like/dislike totals counted from active reactions
    #[instrument(skip(self))]
    pub async fn get_reaction_counts(&self, target_id: Snowflake) -> ServiceResult<ReactionCounts> {
        require_id(target_id, "target_id")?;

        let reactions = self.ctx.reaction_repo();
        let (likes, dislikes) = tokio::try_join!(
            reactions.count_by_type(target_id, ReactionType::Like),
            reactions.count_by_type(target_id, ReactionType::Dislike),
        )?;

        Ok(ReactionCounts::new(likes, dislikes))
    }

    /// Hard-delete reactions that were soft-deleted more than `retention` ago
    #[instrument(skip(self))]
    pub async fn purge_deleted(&self, retention: Duration) -> ServiceResult<u64> {
        let before = self
            .ctx
            .clock()
            .now()
            .checked_sub_signed(retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let purged = self.ctx.reaction_repo().purge_deleted(before).await?;

        info!(purged, before = %before, "Purged soft-deleted reactions");
        Ok(purged)
    }

    async fn toggle(
        &self,
        user_id: Snowflake,
        target_id: Snowflake,
        target_type: TargetType,
        kind: ReactionType,
    ) -> ServiceResult<ReactionState> {
        require_id(user_id, "user_id")?;
        require_id(target_id, "target_id")?;

        // Comment existence belongs to the comment subsystem
        if target_type == TargetType::Post && !self.ctx.content_repo().exists(target_id).await? {
            return Err(ServiceError::not_found("Content", target_id));
        }

        let current = self
            .ctx
            .reaction_repo()
            .find_active(user_id, target_id)
            .await?;
        let (transition, next) = ReactionState::from(current.as_ref()).toggle(kind);

        match (transition, current) {
            (ReactionTransition::Create(reaction_type) | ReactionTransition::ChangeType(reaction_type), _) => {
                let (reaction, created) = self
                    .ctx
                    .reaction_repo()
                    .upsert(
                        self.ctx.generate_id(),
                        user_id,
                        target_id,
                        target_type,
                        reaction_type,
                    )
                    .await?;
                debug!(reaction_id = %reaction.id, created, "Reaction upserted");
            }
            (ReactionTransition::Remove, Some(existing)) => {
                match self.ctx.reaction_repo().soft_delete(existing.id).await {
                    // A concurrent toggle already removed it; same end state
                    Ok(()) | Err(DomainError::ReactionNotFound(_)) => {}
                    Err(e) => return Err(e.into()),
                }
            }
            (ReactionTransition::Remove, None) => {}
        }

        info!(
            user_id = %user_id,
            target_id = %target_id,
            target_type = %target_type,
            kind = %kind,
            state = ?next,
            "Reaction toggled"
        );

        if target_type == TargetType::Post {
            PopularityService::new(self.ctx)
                .refresh_after_reaction(target_id)
                .await;
        }

        Ok(next)
    }
}

fn require_id(id: Snowflake, name: &str) -> ServiceResult<()> {
    if id.is_zero() {
        return Err(ServiceError::invalid_argument(format!("{name} is required")));
    }
    Ok(())
}
