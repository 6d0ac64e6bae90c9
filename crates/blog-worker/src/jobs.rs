//! Maintenance job loop

use std::future::Future;
use std::time::Duration;

use blog_common::WorkerConfig;
use blog_service::{PopularityService, ReactionService, ReconcileReport, ServiceContext};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument};

/// What one maintenance cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// `None` if the sweep could not run
    pub reconcile: Option<ReconcileReport>,
    /// `None` if purging is disabled or failed
    pub purged: Option<u64>,
}

/// Reconciliation sweep plus optional soft-delete purge, on a fixed interval
pub struct MaintenanceJobs {
    ctx: ServiceContext,
    config: WorkerConfig,
}

impl MaintenanceJobs {
    pub fn new(ctx: ServiceContext, config: WorkerConfig) -> Self {
        Self { ctx, config }
    }

    /// One cycle. Failures are logged and reflected in the report.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> CycleReport {
        let reconcile = match PopularityService::new(&self.ctx)
            .reconcile_all(self.config.reconcile_batch_size)
            .await
        {
            Ok(report) => Some(report),
            Err(e) => {
                error!(error = %e, "Reconciliation sweep aborted");
                None
            }
        };

        let purged = match self.config.purge_deleted_reactions_after_days {
            Some(days) => {
                match ReactionService::new(&self.ctx)
                    .purge_deleted(chrono::Duration::days(i64::from(days)))
                    .await
                {
                    Ok(count) => Some(count),
                    Err(e) => {
                        error!(error = %e, "Reaction purge failed");
                        None
                    }
                }
            }
            None => None,
        };

        CycleReport { reconcile, purged }
    }

    /// Run cycles every `reconcile_interval_secs` until `shutdown` resolves.
    /// The first cycle starts immediately.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let period = Duration::from_secs(self.config.reconcile_interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = period.as_secs(),
            batch_size = self.config.reconcile_batch_size,
            purge_after_days = ?self.config.purge_deleted_reactions_after_days,
            "Maintenance worker started"
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Maintenance worker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_once().await;
                }
            }
        }
    }
}
