use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use common::{Config, CrawlOutput, Crawler};
use dcinside::DcInsideCrawler;
use time::OffsetDateTime;
use tracing::info;

/// Runs one full crawl; the browser session is released whatever the outcome.
pub async fn run_trend_crawl(config: &Config) -> Result<CrawlOutput> {
    let mut crawler = DcInsideCrawler::new(config)?;
    let output = crawler.run().await?;
    info!(
        "Crawled {} posts (sentiment: {})",
        output.posts.len(),
        output.trends.sentiment.as_str()
    );
    Ok(output)
}

/// Writes `{dir}/{YYYY-MM-DD}/dcinside-trends.json` and returns its path.
pub async fn write_report(dir: &str, output: &CrawlOutput) -> Result<PathBuf> {
    let today_str = OffsetDateTime::now_utc().date().to_string();
    let path = report_path(Path::new(dir), &today_str);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(output)?;
    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote trend report to {}", path.display());
    Ok(path)
}

fn report_path(dir: &Path, date: &str) -> PathBuf {
    dir.join(date).join("dcinside-trends.json")
}

/// Crawl, then persist the report when a report directory is configured.
pub async fn run_and_report(config: &Config) -> Result<CrawlOutput> {
    let output = run_trend_crawl(config).await?;
    if let Some(dir) = &config.output.report_dir {
        write_report(dir, &output).await?;
    }
    Ok(output)
}
