//! Splits posts into batches that should fit the summarizer's input ceiling.
//!
//! Sizing is a heuristic: the cost of one sample post decides the size of every
//! batch, and batches are not measured again after slicing. A different
//! [`TokenEstimator`] can be plugged in without touching [`BatchGrouper`].

use common::{AnalyzerConfig, Post};
use tracing::debug;

/// Contiguous run of posts sent to the summarizer in one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub posts: Vec<Post>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

pub trait TokenEstimator: Send + Sync {
    /// Estimated tokens one post of `posts` costs once serialized.
    fn tokens_per_post(&self, posts: &[Post]) -> usize;
}

/// Measures only the first post, at a fixed characters-per-token ratio.
#[derive(Debug, Clone)]
pub struct SampleEstimator {
    pub chars_per_token: usize,
    pub sample_comments: usize,
}

impl SampleEstimator {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            chars_per_token: config.chars_per_token,
            sample_comments: config.sample_comments,
        }
    }

    fn sample_text(&self, post: &Post) -> String {
        let mut text = post.title.clone();
        if let Some(content) = &post.content {
            text.push_str(content);
        }
        for comment in post.comments.iter().take(self.sample_comments) {
            text.push_str(&comment.content);
        }
        text
    }
}

impl TokenEstimator for SampleEstimator {
    fn tokens_per_post(&self, posts: &[Post]) -> usize {
        let Some(sample) = posts.first() else {
            return 1;
        };
        let chars = self.sample_text(sample).chars().count();
        chars.div_ceil(self.chars_per_token.max(1)).max(1)
    }
}

pub struct BatchGrouper<E = SampleEstimator> {
    token_limit: usize,
    prompt_overhead: usize,
    max_group_size: usize,
    estimator: E,
}

impl BatchGrouper<SampleEstimator> {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::with_estimator(config, SampleEstimator::from_config(config))
    }
}

impl<E: TokenEstimator> BatchGrouper<E> {
    pub fn with_estimator(config: &AnalyzerConfig, estimator: E) -> Self {
        Self {
            token_limit: config.token_limit,
            prompt_overhead: config.prompt_overhead,
            max_group_size: config.max_group_size.max(1),
            estimator,
        }
    }

    /// `floor((limit - overhead) / tokens_per_post)` clamped to `[1, max_group_size]`.
    pub fn group_size(&self, posts: &[Post]) -> usize {
        let tokens_per_post = self.estimator.tokens_per_post(posts).max(1);
        let budget = self.token_limit.saturating_sub(self.prompt_overhead);
        (budget / tokens_per_post).clamp(1, self.max_group_size)
    }

    pub fn group(&self, posts: &[Post]) -> Vec<Batch> {
        if posts.is_empty() {
            return Vec::new();
        }

        let size = self.group_size(posts);
        let batches: Vec<Batch> = posts
            .chunks(size)
            .map(|chunk| Batch { posts: chunk.to_vec() })
            .collect();

        debug!(posts = posts.len(), group_size = size, batches = batches.len(), "Grouped posts into batches");
        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Comment;

    fn config(token_limit: usize, max_group_size: usize) -> AnalyzerConfig {
        let mut config = AnalyzerConfig::new("test-key");
        config.token_limit = token_limit;
        config.prompt_overhead = 100;
        config.chars_per_token = 2;
        config.max_group_size = max_group_size;
        config
    }

    fn posts(n: usize, title_len: usize) -> Vec<Post> {
        (0..n)
            .map(|i| Post::new(format!("{:0>width$}", i, width = title_len), None))
            .collect()
    }

    #[test]
    fn test_sample_estimator_uses_first_post_only() {
        let estimator = SampleEstimator { chars_per_token: 2, sample_comments: 1 };
        let first = Post::new("abcd", None).with_detail(
            Some("efgh".to_string()),
            vec![Comment::new("ij"), Comment::new("never counted")],
        );
        let long = Post::new("x".repeat(1_000), None);
        assert_eq!(estimator.tokens_per_post(&[first, long]), 5);
        assert_eq!(estimator.tokens_per_post(&[]), 1);
    }

    #[test]
    fn test_group_size_from_budget() {
        // 40 chars -> 20 tokens; (500 - 100) / 20 = 20, capped at 10
        let grouper = BatchGrouper::from_config(&config(500, 10));
        assert_eq!(grouper.group_size(&posts(3, 40)), 10);

        // (300 - 100) / 20 = 10 -> 10, then 200 / 50 = 4
        let grouper = BatchGrouper::from_config(&config(300, 50));
        assert_eq!(grouper.group_size(&posts(3, 40)), 10);
        assert_eq!(grouper.group_size(&posts(3, 100)), 4);
    }

    #[test]
    fn test_group_size_never_below_one() {
        let grouper = BatchGrouper::from_config(&config(50, 10));
        assert_eq!(grouper.group_size(&posts(2, 10_000)), 1);
    }

    #[test]
    fn test_batches_partition_contiguously() {
        let grouper = BatchGrouper::from_config(&config(300, 50));
        let input = posts(11, 100);
        let batches = grouper.group(&input);

        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![4, 4, 3]);
        assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= 50));

        let rejoined: Vec<Post> = batches.into_iter().flat_map(|b| b.posts).collect();
        assert_eq!(rejoined, input);
    }

    #[test]
    fn test_empty_input_has_no_batches() {
        let grouper = BatchGrouper::from_config(&config(300, 10));
        assert!(grouper.group(&[]).is_empty());
    }
}
