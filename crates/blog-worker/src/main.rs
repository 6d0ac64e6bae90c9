//! Engagement maintenance worker entry point
//!
//! Run with:
//! ```bash
//! cargo run -p blog-worker
//! ```
//!
//! Configuration is loaded from environment variables (or `.env`).

use blog_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Worker failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        interval_secs = config.worker.reconcile_interval_secs,
        "Configuration loaded"
    );

    blog_worker::run(config).await?;
    Ok(())
}
