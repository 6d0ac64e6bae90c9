//! Popularity service
//!
//! Keeps the cached popularity score on each post in line with its counters.
//! Popularity is a projection: writes here are never transactional with the
//! counter changes that trigger them, and the reconciliation sweep repairs
//! whatever drifts.

use blog_core::entities::{ContentPatch, EngagementCounters, ReactionType};
use blog_core::Snowflake;
use tracing::{debug, info, instrument, warn};

use crate::dto::ReconcileReport;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Popularity service
pub struct PopularityService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PopularityService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Score `counters` with the configured weights
    pub fn score(&self, counters: &EngagementCounters) -> f64 {
        self.ctx.engagement().popularity.score(counters)
    }

    /// Recompute popularity from the denormalized counters and store it
    #[instrument(skip(self))]
    pub async fn recompute(&self, target_id: Snowflake) -> ServiceResult<f64> {
        let counters = self.load_counters(target_id).await?;
        let score = self.score(&counters);

        self.ctx
            .content_repo()
            .patch_fields(target_id, &ContentPatch::popularity(score))
            .await?;

        debug!(target_id = %target_id, score, "Popularity recomputed");
        Ok(score)
    }

    /// Re-derive like/dislike counts from the reaction store, then patch both
    /// counts and popularity in one write
    #[instrument(skip(self))]
    pub async fn sync_reactions(&self, target_id: Snowflake) -> ServiceResult<f64> {
        let mut counters = self.load_counters(target_id).await?;

        let reactions = self.ctx.reaction_repo();
        let (likes, dislikes) = tokio::try_join!(
            reactions.count_by_type(target_id, ReactionType::Like),
            reactions.count_by_type(target_id, ReactionType::Dislike),
        )?;
        counters.likes = likes;
        counters.dislikes = dislikes;

        let score = self.score(&counters);
        let patch = ContentPatch::popularity(score).with_reaction_counts(likes, dislikes);
        self.ctx.content_repo().patch_fields(target_id, &patch).await?;

        debug!(target_id = %target_id, likes, dislikes, score, "Reaction counts synced");
        Ok(score)
    }

    /// Run `sync_reactions` over every live post, `batch_size` ids at a time.
    ///
    /// Per-item failures are counted and logged; only a failure to list ids
    /// aborts the sweep.
    #[instrument(skip(self))]
    pub async fn reconcile_all(&self, batch_size: i64) -> ServiceResult<ReconcileReport> {
        if batch_size < 1 {
            return Err(ServiceError::invalid_argument("batch_size must be positive"));
        }

        let mut report = ReconcileReport::default();
        let mut after = None;

        loop {
            let page = self.ctx.content_repo().list_ids(after, batch_size).await?;

            for &target_id in &page {
                report.scanned += 1;
                match self.sync_reactions(target_id).await {
                    Ok(_) => report.updated += 1,
                    Err(e) => {
                        report.failed += 1;
                        warn!(target_id = %target_id, error = %e, "Reconcile failed for item");
                    }
                }
            }

            match page.last() {
                Some(&last) if i64::try_from(page.len()).unwrap_or(i64::MAX) >= batch_size => {
                    after = Some(last);
                }
                _ => break,
            }
        }

        info!(
            scanned = report.scanned,
            updated = report.updated,
            failed = report.failed,
            "Reconciliation sweep finished"
        );
        Ok(report)
    }

    /// Best-effort recompute after a counted view; failures are only logged
    pub(crate) async fn refresh_after_view(&self, target_id: Snowflake) {
        if let Err(e) = self.recompute(target_id).await {
            warn!(target_id = %target_id, error = %e, "Popularity refresh after view failed");
        }
    }

    /// Best-effort sync after a reaction change; failures are only logged
    pub(crate) async fn refresh_after_reaction(&self, target_id: Snowflake) {
        if let Err(e) = self.sync_reactions(target_id).await {
            warn!(target_id = %target_id, error = %e, "Popularity refresh after reaction failed");
        }
    }

    async fn load_counters(&self, target_id: Snowflake) -> ServiceResult<EngagementCounters> {
        self.ctx
            .content_repo()
            .get_counters(target_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Content", target_id))
    }
}
