//! View service
//!
//! Decides whether a page view counts. Stages run in order and stop at the
//! first verdict:
//!
//! 1. precondition (target and some identity present)
//! 2. bot filter, silently ignored
//! 3. recency dedup on the viewer identity, silently ignored
//! 4. IP velocity ceiling, rejected
//! 5. IP rotation ceiling for signed-in users, rejected
//! 6. acceptance: event write, then counter increment, then popularity
//!
//! Repeats and rejections still count toward the IP velocity total, so
//! reloading one page cannot hide a flood from the ceiling. Any store failure
//! before the counter increment leaves the view uncounted.

use std::time::Duration;

use blog_core::entities::{CounterField, ViewEvent, ViewIdentity};
use chrono::{DateTime, Duration as TimeDelta, Utc};
use tracing::{debug, info, instrument};

use crate::dto::{IgnoreReason, TrackViewRequest, ViewOutcome};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult, SuspicionReason};
use super::popularity::PopularityService;

/// Case-insensitive user-agent substring matcher
#[derive(Debug, Clone, Default)]
pub struct BotFilter {
    signatures: Vec<String>,
}

impl BotFilter {
    pub fn new<S: AsRef<str>>(signatures: &[S]) -> Self {
        Self {
            signatures: signatures
                .iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn is_bot(&self, user_agent: &str) -> bool {
        let user_agent = user_agent.to_lowercase();
        self.signatures.iter().any(|sig| user_agent.contains(sig.as_str()))
    }
}

/// Start of a window ending at `now`, saturating at the earliest instant
fn window_start(now: DateTime<Utc>, window: TimeDelta) -> DateTime<Utc> {
    now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// View service
pub struct ViewService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ViewService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Run the view pipeline for one request
    #[instrument(skip(self, request), fields(target_id = %request.target_id))]
    pub async fn track_view(&self, request: &TrackViewRequest) -> ServiceResult<ViewOutcome> {
        let viewer = request.viewer();
        let ip = request.ip();

        if request.target_id.is_zero() {
            return Err(ServiceError::invalid_argument("target_id is required"));
        }
        if viewer.is_none() && ip.is_empty() {
            return Err(ServiceError::invalid_argument(
                "either user_id or ip_address is required",
            ));
        }

        if self.ctx.bot_filter().is_bot(&request.user_agent) {
            debug!(user_agent = %request.user_agent, "Ignoring bot view");
            return Ok(ViewOutcome::Ignored(IgnoreReason::Bot));
        }

        let config = self.ctx.engagement();
        let views = self.ctx.view_repo();
        let now = self.ctx.clock().now();
        let identity = ViewIdentity::resolve(viewer, ip);
        let event = ViewEvent::new(
            request.target_id,
            viewer,
            ip,
            request.user_agent.as_str(),
            now,
        );

        if views
            .exists(
                &identity,
                request.target_id,
                window_start(now, config.view_retention()),
            )
            .await?
        {
            views.record_attempt(&event).await?;
            debug!(identity = %identity, "Ignoring repeat view");
            return Ok(ViewOutcome::Ignored(IgnoreReason::Duplicate));
        }

        // Both ceilings count the request being judged
        if !ip.is_empty() {
            let since = window_start(now, config.velocity_window());
            let count = views.count_by_ip(ip, since).await? + 1;
            if count > config.velocity_limit {
                views.record_attempt(&event).await?;
                info!(ip = %ip, count, limit = config.velocity_limit, "IP velocity exceeded");
                return Err(ServiceError::SuspiciousActivity(SuspicionReason::IpVelocity {
                    count,
                    limit: config.velocity_limit,
                }));
            }
        }

        if let Some(user_id) = viewer {
            let since = window_start(now, config.rotation_window());
            let mut distinct_ips = views.count_distinct_ips_for_user(user_id, since).await?;
            if !ip.is_empty() && !views.user_has_ip(user_id, ip, since).await? {
                distinct_ips += 1;
            }
            if distinct_ips > config.rotation_limit {
                views.record_attempt(&event).await?;
                info!(
                    user_id = %user_id,
                    distinct_ips,
                    limit = config.rotation_limit,
                    "IP rotation exceeded"
                );
                return Err(ServiceError::SuspiciousActivity(SuspicionReason::IpRotation {
                    distinct_ips,
                    limit: config.rotation_limit,
                }));
            }
        }

        if !self.ctx.content_repo().exists(request.target_id).await? {
            return Err(ServiceError::not_found("Content", request.target_id));
        }

        views.insert(&event).await?;
        self.ctx
            .content_repo()
            .increment_counter(request.target_id, CounterField::Views, 1)
            .await?;

        debug!(identity = %identity, "View counted");

        PopularityService::new(self.ctx)
            .refresh_after_view(request.target_id)
            .await;

        Ok(ViewOutcome::Accepted)
    }

    /// [`track_view`](Self::track_view) bounded by `timeout`.
    ///
    /// On expiry the pipeline future is dropped; if that happens between the
    /// event write and the counter increment the view goes uncounted.
    pub async fn track_view_with_timeout(
        &self,
        request: &TrackViewRequest,
        timeout: Duration,
    ) -> ServiceResult<ViewOutcome> {
        tokio::time::timeout(timeout, self.track_view(request))
            .await
            .map_err(|_| ServiceError::Timeout)?
    }
}
