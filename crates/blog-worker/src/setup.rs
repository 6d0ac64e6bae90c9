//! Dependency wiring for the worker process

use std::sync::Arc;

use blog_cache::RedisPool;
use blog_common::{AppConfig, AppError};
use blog_core::SnowflakeGenerator;
use blog_db::{create_pool, run_migrations, DatabaseConfig};
use blog_service::ServiceContext;
use tracing::info;

use crate::jobs::MaintenanceJobs;

/// Connect the stores and build the service context
pub async fn create_service_context(config: &AppConfig) -> Result<ServiceContext, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool =
        RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    redis_pool
        .health_check()
        .await
        .map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis connection established");

    let worker_id = config.snowflake.worker_id;
    let snowflake_generator = SnowflakeGenerator::new(worker_id)
        .map(Arc::new)
        .ok_or_else(|| AppError::Config(format!("WORKER_ID {worker_id} out of range")))?;

    Ok(ServiceContext::with_stores(
        pool,
        redis_pool,
        config.engagement.clone(),
        snowflake_generator,
    ))
}

/// Run maintenance jobs until Ctrl-C
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let ctx = create_service_context(&config).await?;
    let jobs = MaintenanceJobs::new(ctx, config.worker);

    jobs.run_until(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    })
    .await;

    Ok(())
}
