pub mod browserless;
pub mod dedup;
pub mod dom;
pub mod extract;
pub mod navigator;

use std::sync::Arc;

use async_trait::async_trait;
use common::{Config, CrawlOutput, Crawler, CrawlerConfig, CrawlerError, CrawlerResult, Post, PostTitle};
use tracing::{error, info, warn};
use trend_analyzer::TrendAnalyzer;

pub use browserless::BrowserlessLauncher;
pub use dedup::dedup;
pub use dom::evaluate;
pub use extract::{DetailExtractor, ListingExtractor, PostDetail};
pub use navigator::{HttpLauncher, Launcher, NavigateOptions, Navigator};

/// Crawls the DCInside mobile live-best listing and analyses its trend.
///
/// `initialize` must succeed before `crawl`; `cleanup` releases the session.
pub struct DcInsideCrawler {
    config: CrawlerConfig,
    launcher: Arc<dyn Launcher>,
    page: Option<Box<dyn Navigator>>,
    listing: Arc<ListingExtractor>,
    detail: Arc<DetailExtractor>,
    trend_analyzer: TrendAnalyzer,
}

impl DcInsideCrawler {
    pub fn new(config: &Config) -> CrawlerResult<Self> {
        let launcher: Arc<dyn Launcher> = match &config.crawler.browserless_url {
            Some(url) => Arc::new(BrowserlessLauncher::new(url, config.crawler.browserless_token.as_deref())),
            None => Arc::new(HttpLauncher),
        };
        Self::with_parts(config.crawler.clone(), launcher, TrendAnalyzer::new(&config.analyzer))
    }

    pub fn with_parts(
        config: CrawlerConfig,
        launcher: Arc<dyn Launcher>,
        trend_analyzer: TrendAnalyzer,
    ) -> CrawlerResult<Self> {
        Ok(Self {
            listing: Arc::new(ListingExtractor::new(&config)?),
            detail: Arc::new(DetailExtractor::new(&config)?),
            config,
            launcher,
            page: None,
            trend_analyzer,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.page.is_some()
    }

    async fn fetch_listing(page: &mut Box<dyn Navigator>, listing: Arc<ListingExtractor>, url: &str, options: &NavigateOptions) -> CrawlerResult<Vec<Post>> {
        let html = page.navigate(url, options).await?;
        evaluate(html, url, options.timeout, move |doc| listing.extract(doc)).await
    }

    async fn fetch_detail(page: &mut Box<dyn Navigator>, detail: Arc<DetailExtractor>, url: &str, options: &NavigateOptions) -> CrawlerResult<PostDetail> {
        let html = page.navigate(url, options).await?;
        evaluate(html, url, options.timeout, move |doc| detail.extract(doc)).await
    }
}

#[async_trait]
impl Crawler for DcInsideCrawler {
    type Output = CrawlOutput;

    async fn initialize(&mut self) -> CrawlerResult<()> {
        if self.page.is_some() {
            info!("Browser session already initialized");
            return Ok(());
        }

        info!("Launching browser session");
        match self.launcher.launch(&self.config).await {
            Ok(page) => {
                self.page = Some(page);
                info!("Browser session initialized");
                Ok(())
            }
            Err(e) => {
                error!("Browser initialization failed: {}", e);
                Err(e)
            }
        }
    }

    async fn crawl(&mut self) -> CrawlerResult<CrawlOutput> {
        let page = self.page.as_mut().ok_or(CrawlerError::NotInitialized)?;
        let options = NavigateOptions::from_config(&self.config);
        let listing_url = self.config.listing_url();

        info!("Fetching listing page: {}", listing_url);
        let raw_posts = Self::fetch_listing(page, Arc::clone(&self.listing), &listing_url, &options).await?;

        let mut posts = dedup(raw_posts);
        posts.truncate(self.config.posts_limit);
        info!("Collected {} unique posts", posts.len());

        let mut enriched = Vec::with_capacity(posts.len());
        for post in posts {
            let Some(url) = post.url.clone() else {
                enriched.push(post);
                continue;
            };

            match Self::fetch_detail(page, Arc::clone(&self.detail), &url, &options).await {
                Ok(detail) => enriched.push(post.with_detail(detail.content, detail.comments)),
                Err(e) => {
                    warn!("Failed to fetch post detail {}: {}", url, e);
                    enriched.push(post.with_detail(None, Vec::new()));
                }
            }
        }

        let trends = self.trend_analyzer.analyze_trends(&enriched).await?;
        info!("Trend analysis complete (sentiment: {})", trends.sentiment.as_str());

        Ok(CrawlOutput {
            posts: enriched
                .into_iter()
                .map(|post| PostTitle { title: post.title })
                .collect(),
            trends,
        })
    }

    async fn cleanup(&mut self) -> CrawlerResult<()> {
        if let Some(mut page) = self.page.take() {
            info!("Closing browser session");
            if let Err(e) = page.close().await {
                error!("Failed to close browser session: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "DCInside"
    }
}
