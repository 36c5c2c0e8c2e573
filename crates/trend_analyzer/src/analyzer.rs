use std::sync::Arc;

use common::{truncate_chars, AnalyzerConfig, CrawlerResult, PartialResult, Post, Sentiment};
use serde_json::Value;
use tracing::{debug, warn};

use crate::grouper::Batch;
use crate::summarizer::{SummaryRequest, Summarizer};

const SYSTEM_INSTRUCTION: &str =
    "게시물의 트렌드를 분석하는 전문가입니다. JSON 형식으로 분석 결과를 제공합니다.";

const PROMPT_HEADER: &str = "다음은 디시인사이드의 실시간 인기 게시물들입니다. \
이 게시물들을 분석하여 다음 정보를 JSON 객체 하나로 제공해주세요:

1. summary: 전반적인 트렌드에 대한 간단한 요약 (1-2문장, 문자열)
2. sentiment: 전반적인 정서 (\"positive\", \"negative\", \"neutral\" 중 하나)

분석할 게시물:
";

/// Per-post caps applied while serializing a batch.
#[derive(Debug, Clone, Copy)]
pub struct PromptLimits {
    pub max_title_chars: usize,
    pub max_content_chars: usize,
    pub max_comments: usize,
    pub max_comment_chars: usize,
}

impl PromptLimits {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            max_title_chars: config.max_title_chars,
            max_content_chars: config.max_content_chars,
            max_comments: config.max_comments,
            max_comment_chars: config.max_comment_chars,
        }
    }
}

/// Turns one batch into exactly one [`PartialResult`].
#[derive(Clone)]
pub struct BatchAnalyzer {
    summarizer: Arc<dyn Summarizer>,
    limits: PromptLimits,
}

impl BatchAnalyzer {
    pub fn new(summarizer: Arc<dyn Summarizer>, limits: PromptLimits) -> Self {
        Self { summarizer, limits }
    }

    /// Malformed payloads degrade to the failure result; transport errors propagate.
    pub async fn analyze(&self, batch: &Batch) -> CrawlerResult<PartialResult> {
        let request = self.build_request(batch);
        debug!(posts = batch.len(), prompt_chars = request.prompt.chars().count(), "Analyzing batch");

        let raw = self.summarizer.summarize(&request).await?;
        Ok(parse_response(raw.as_deref()))
    }

    pub fn build_request(&self, batch: &Batch) -> SummaryRequest {
        let posts_text = batch
            .posts
            .iter()
            .map(|post| self.serialize_post(post))
            .collect::<Vec<_>>()
            .join("\n---\n");

        SummaryRequest {
            system: SYSTEM_INSTRUCTION.to_string(),
            prompt: format!("{}{}", PROMPT_HEADER, posts_text),
        }
    }

    fn serialize_post(&self, post: &Post) -> String {
        let limits = &self.limits;
        let title = truncate_chars(&post.title, limits.max_title_chars);
        let content = post
            .content
            .as_deref()
            .map(|c| truncate_chars(c, limits.max_content_chars))
            .unwrap_or_else(|| "내용 없음".to_string());
        let comments = if post.comments.is_empty() {
            "댓글 없음".to_string()
        } else {
            post.comments
                .iter()
                .take(limits.max_comments)
                .map(|c| truncate_chars(&c.content, limits.max_comment_chars))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        format!("제목: {}\n내용: {}\n댓글: {}", title, content, comments)
    }
}

/// Reads `{"summary": string, "sentiment": label}` out of a raw payload.
pub fn parse_response(raw: Option<&str>) -> PartialResult {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        warn!("Summarizer returned no payload");
        return PartialResult::failed();
    };

    let value: Value = match serde_json::from_str(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            warn!("Summarizer payload is not an object: {}", other);
            return PartialResult::failed();
        }
        Err(e) => {
            warn!("Summarizer payload is not valid JSON: {}", e);
            return PartialResult::failed();
        }
    };

    let failed = PartialResult::failed();
    let summary = match value.get("summary") {
        Some(Value::String(s)) => s.clone(),
        _ => failed.summary,
    };
    let sentiment = value
        .get("sentiment")
        .and_then(Value::as_str)
        .and_then(Sentiment::from_label)
        .unwrap_or(Sentiment::Neutral);

    PartialResult::new(summary, sentiment)
}
