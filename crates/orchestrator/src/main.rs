use anyhow::Result;
use common::Config;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    let _ = dotenv::dotenv();

    // Configure tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env()?;

    match orchestrator::run_and_report(&config).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            info!("DCInside trend crawl finished");
            Ok(())
        }
        Err(e) => {
            error!("DCInside trend crawl failed: {:#}", e);
            Err(e)
        }
    }
}
