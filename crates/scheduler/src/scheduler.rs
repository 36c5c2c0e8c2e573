use anyhow::{Context, Result};
use tokio_cron_scheduler::{JobScheduler, Job};
use tracing::{info, error};
use time::OffsetDateTime;
use std::sync::Arc;

/// Cron-driven runner for recurring crawls.
pub struct CrawlScheduler {
    scheduler: JobScheduler,
}

impl CrawlScheduler {
    pub async fn new() -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
        })
    }

    /// Registers `job_fn` under a six-field cron expression (seconds first).
    pub async fn add_job<F, Fut>(&mut self, cron_expression: &str, job_fn: F) -> Result<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        info!("Scheduling job with cron: {}", cron_expression);

        let job_fn = Arc::new(job_fn);
        let job = Job::new_async(cron_expression, move |_uuid, _l| {
            let job_fn = job_fn.clone();
            Box::pin(async move {
                info!("Executing scheduled job at {}", OffsetDateTime::now_utc());
                match job_fn().await {
                    Ok(()) => info!("Scheduled job completed successfully"),
                    Err(e) => error!("Scheduled job failed: {:#}", e),
                }
            })
        })
        .with_context(|| format!("Invalid cron expression: {}", cron_expression))?;

        self.scheduler.add(job).await?;
        Ok(())
    }

    pub async fn start(&self) -> Result<()> {
        info!("Starting scheduler...");
        self.scheduler.start().await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down scheduler...");
        self.scheduler.shutdown().await?;
        Ok(())
    }
}
