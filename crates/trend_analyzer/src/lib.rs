pub mod analyzer;
pub mod grouper;
pub mod merger;
pub mod summarizer;

use std::sync::Arc;

use common::{AnalyzerConfig, CrawlerResult, Post, TrendResult};
use futures::future::try_join_all;
use tracing::info;

pub use analyzer::{parse_response, BatchAnalyzer, PromptLimits};
pub use grouper::{Batch, BatchGrouper, SampleEstimator, TokenEstimator};
pub use merger::merge;
pub use summarizer::{OpenAiSummarizer, SummaryRequest, Summarizer};

/// Groups posts, analyses every batch concurrently and merges the results.
pub struct TrendAnalyzer<E = SampleEstimator> {
    grouper: BatchGrouper<E>,
    analyzer: BatchAnalyzer,
}

impl TrendAnalyzer<SampleEstimator> {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self::with_summarizer(config, Arc::new(OpenAiSummarizer::new(config)))
    }

    pub fn with_summarizer(config: &AnalyzerConfig, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            grouper: BatchGrouper::from_config(config),
            analyzer: BatchAnalyzer::new(summarizer, PromptLimits::from_config(config)),
        }
    }
}

impl<E: TokenEstimator> TrendAnalyzer<E> {
    pub fn with_parts(grouper: BatchGrouper<E>, analyzer: BatchAnalyzer) -> Self {
        Self { grouper, analyzer }
    }

    pub async fn analyze_trends(&self, posts: &[Post]) -> CrawlerResult<TrendResult> {
        if posts.is_empty() {
            info!("No posts to analyze");
            return Ok(TrendResult::failed());
        }

        let batches = self.grouper.group(posts);
        info!("Analyzing {} posts in {} batches", posts.len(), batches.len());

        let results = try_join_all(batches.iter().map(|batch| self.analyzer.analyze(batch))).await?;

        let failed = results.iter().filter(|r| r.is_failed()).count();
        let trend = merge(&results);
        info!(
            "Trend analysis finished. Batches: {}, Failed: {}, Sentiment: {}",
            results.len(),
            failed,
            trend.sentiment.as_str()
        );
        Ok(trend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::{CrawlerError, Sentiment, ANALYSIS_FAILED};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replies with the batch's first title as the summary.
    struct Echo {
        calls: AtomicUsize,
        fail_on: Option<&'static str>,
    }

    impl Echo {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0), fail_on: None }
        }
    }

    #[async_trait]
    impl Summarizer for Echo {
        async fn summarize(&self, request: &SummaryRequest) -> CrawlerResult<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let title = request
                .prompt
                .lines()
                .find_map(|l| l.strip_prefix("제목: "))
                .unwrap_or_default()
                .to_string();
            if self.fail_on == Some(title.as_str()) {
                return Err(CrawlerError::Api { status: 500, message: "down".to_string() });
            }
            if title == "garbled" {
                return Ok(Some("<html>".to_string()));
            }
            let sentiment = if title == "p0" { "neutral" } else { "positive" };
            Ok(Some(serde_json::json!({ "summary": title, "sentiment": sentiment }).to_string()))
        }
    }

    fn config() -> AnalyzerConfig {
        let mut config = AnalyzerConfig::new("test-key");
        config.max_group_size = 2;
        config
    }

    fn posts(titles: &[&str]) -> Vec<Post> {
        titles.iter().map(|t| Post::new(*t, None)).collect()
    }

    #[tokio::test]
    async fn test_one_call_per_batch_merged_in_order() {
        let echo = Arc::new(Echo::new());
        let analyzer = TrendAnalyzer::with_summarizer(&config(), echo.clone());

        let trend = analyzer.analyze_trends(&posts(&["p0", "p1", "p2", "p3", "p4"])).await.unwrap();
        assert_eq!(echo.calls.load(Ordering::SeqCst), 3);
        assert_eq!(trend.summary, "p0\np2\np4");
        assert_eq!(trend.sentiment, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn test_malformed_batch_is_absorbed() {
        let analyzer = TrendAnalyzer::with_summarizer(&config(), Arc::new(Echo::new()));
        let trend = analyzer.analyze_trends(&posts(&["garbled", "x", "p2"])).await.unwrap();
        assert_eq!(trend.summary, "p2");
        // the garbled first batch still decides the sentiment
        assert_eq!(trend.sentiment, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn test_transport_error_fails_analysis() {
        let echo = Arc::new(Echo { calls: AtomicUsize::new(0), fail_on: Some("p2") });
        let analyzer = TrendAnalyzer::with_summarizer(&config(), echo);
        let err = analyzer.analyze_trends(&posts(&["p0", "p1", "p2"])).await.unwrap_err();
        assert!(matches!(err, CrawlerError::Api { status: 500, .. }));
    }

    struct Fixed(usize);

    impl TokenEstimator for Fixed {
        fn tokens_per_post(&self, _posts: &[Post]) -> usize {
            self.0
        }
    }

    #[tokio::test]
    async fn test_custom_estimator() {
        let mut config = config();
        config.max_group_size = 10;
        config.token_limit = 1_500;
        config.prompt_overhead = 500;

        let echo = Arc::new(Echo::new());
        let analyzer = TrendAnalyzer::with_parts(
            BatchGrouper::with_estimator(&config, Fixed(400)),
            BatchAnalyzer::new(echo.clone(), PromptLimits::from_config(&config)),
        );
        analyzer.analyze_trends(&posts(&["a", "b", "c", "d", "e"])).await.unwrap();
        assert_eq!(echo.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_posts_skips_summarizer() {
        let echo = Arc::new(Echo::new());
        let analyzer = TrendAnalyzer::with_summarizer(&config(), echo.clone());
        let trend = analyzer.analyze_trends(&[]).await.unwrap();
        assert_eq!(trend.summary, ANALYSIS_FAILED);
        assert_eq!(echo.calls.load(Ordering::SeqCst), 0);
    }
}
