mod scheduler;

use anyhow::Result;
use common::Config;
use scheduler::CrawlScheduler;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

async fn run_scheduled_crawl(config: Arc<Config>) -> Result<()> {
    info!("Starting scheduled DCInside trend crawl");
    let output = orchestrator::run_and_report(&config).await?;
    info!("{}", output.trends.summary);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    let _ = dotenv::dotenv();

    // Configure tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Arc::new(Config::from_env()?);
    let schedule = config.output.schedule.clone();

    let mut scheduler = CrawlScheduler::new().await?;
    scheduler.add_job(&schedule, move || {
        run_scheduled_crawl(Arc::clone(&config))
    }).await?;

    info!("Scheduler configured with cron: {}", schedule);
    info!("Press Ctrl+C to stop the scheduler");
    scheduler.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("Received interrupt signal, shutting down...");
    scheduler.shutdown().await?;

    Ok(())
}
