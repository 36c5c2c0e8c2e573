use async_trait::async_trait;
use tracing::{info, warn};
use crate::error::CrawlerResult;

/// A crawler that owns an exclusive session between `initialize` and `cleanup`.
#[async_trait]
pub trait Crawler: Send {
    type Output: Send;

    async fn initialize(&mut self) -> CrawlerResult<()>;
    async fn crawl(&mut self) -> CrawlerResult<Self::Output>;
    async fn cleanup(&mut self) -> CrawlerResult<()>;
    fn name(&self) -> &'static str;

    /// Initializes, crawls and always cleans up, whatever happened before.
    ///
    /// The first failure wins: a crawl error is returned even when cleanup
    /// also fails, and a cleanup error is only surfaced after a successful crawl.
    async fn run(&mut self) -> CrawlerResult<Self::Output> {
        let name = self.name();
        info!("{} starting up", name);

        let result = match self.initialize().await {
            Ok(()) => self.crawl().await,
            Err(e) => Err(e),
        };

        let cleanup = self.cleanup().await;

        match (result, cleanup) {
            (Ok(output), Ok(())) => {
                info!("{} completed successfully", name);
                Ok(output)
            }
            (Ok(_), Err(e)) => {
                warn!("{} cleanup failed: {}", name, e);
                Err(e)
            }
            (Err(e), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    warn!("{} cleanup failed after error: {}", name, cleanup_err);
                }
                warn!("{} failed: {}", name, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrawlerError;

    #[derive(Default)]
    struct Probe {
        fail_init: bool,
        fail_crawl: bool,
        fail_cleanup: bool,
        live: bool,
        cleanups: usize,
    }

    #[async_trait]
    impl Crawler for Probe {
        type Output = u32;

        async fn initialize(&mut self) -> CrawlerResult<()> {
            if self.fail_init {
                return Err(CrawlerError::BrowserLaunch("no chrome".to_string()));
            }
            self.live = true;
            Ok(())
        }

        async fn crawl(&mut self) -> CrawlerResult<u32> {
            if !self.live {
                return Err(CrawlerError::NotInitialized);
            }
            if self.fail_crawl {
                return Err(CrawlerError::Parse("boom".to_string()));
            }
            Ok(7)
        }

        async fn cleanup(&mut self) -> CrawlerResult<()> {
            self.cleanups += 1;
            self.live = false;
            if self.fail_cleanup {
                return Err(CrawlerError::Parse("close".to_string()));
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "Probe"
        }
    }

    #[tokio::test]
    async fn test_run_success() {
        let mut probe = Probe::default();
        assert_eq!(probe.run().await.unwrap(), 7);
        assert_eq!(probe.cleanups, 1);
        assert!(!probe.live);
    }

    #[tokio::test]
    async fn test_run_cleans_up_after_crawl_error() {
        let mut probe = Probe { fail_crawl: true, fail_cleanup: true, ..Default::default() };
        let err = probe.run().await.unwrap_err();
        assert!(matches!(err, CrawlerError::Parse(ref m) if m == "boom"));
        assert_eq!(probe.cleanups, 1);
    }

    #[tokio::test]
    async fn test_run_cleans_up_after_init_error() {
        let mut probe = Probe { fail_init: true, ..Default::default() };
        let err = probe.run().await.unwrap_err();
        assert!(err.is_navigation());
        assert_eq!(probe.cleanups, 1);
    }

    #[tokio::test]
    async fn test_run_surfaces_cleanup_error() {
        let mut probe = Probe { fail_cleanup: true, ..Default::default() };
        assert!(probe.run().await.is_err());
    }
}
