use serde::{Deserialize, Serialize};

/// Summary used whenever a batch (or the whole crawl) could not be analysed.
pub const ANALYSIS_FAILED: &str = "분석에 실패했습니다.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Comment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: None,
        }
    }
}

/// One entry harvested from the live-best listing.
///
/// `title` is the normalized title and doubles as the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub url: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn new(title: impl Into<String>, url: Option<String>) -> Self {
        Self {
            title: title.into(),
            url,
            content: None,
            comments: Vec::new(),
        }
    }

    pub fn with_detail(mut self, content: Option<String>, comments: Vec<Comment>) -> Self {
        self.content = content;
        self.comments = comments;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    /// Recognizes the English labels (any case) and the Korean ones the
    /// summarizer tends to answer with.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "positive" | "긍정" => Some(Sentiment::Positive),
            "negative" | "부정" => Some(Sentiment::Negative),
            "neutral" | "중립" => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Outcome of analysing one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialResult {
    pub summary: String,
    pub sentiment: Sentiment,
}

impl PartialResult {
    pub fn new(summary: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            summary: summary.into(),
            sentiment,
        }
    }

    pub fn failed() -> Self {
        Self::new(ANALYSIS_FAILED, Sentiment::Neutral)
    }

    pub fn is_failed(&self) -> bool {
        self.summary == ANALYSIS_FAILED
    }
}

/// Aggregate trend for one crawl cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendResult {
    pub summary: String,
    pub sentiment: Sentiment,
}

impl TrendResult {
    pub fn failed() -> Self {
        Self {
            summary: ANALYSIS_FAILED.to_string(),
            sentiment: Sentiment::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTitle {
    pub title: String,
}

/// What a crawl hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlOutput {
    pub posts: Vec<PostTitle>,
    pub trends: TrendResult,
}
