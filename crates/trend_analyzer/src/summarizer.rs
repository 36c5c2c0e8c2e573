use async_trait::async_trait;
use common::{AnalyzerConfig, CrawlerError, CrawlerResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One request to the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub system: String,
    pub prompt: String,
}

/// External text-generation service asked for a single JSON object.
///
/// `Ok(None)` means the service answered without a payload. Transport
/// failures and non-success statuses are errors.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> CrawlerResult<Option<String>>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Chat-completions client for OpenAI and compatible endpoints.
#[derive(Clone)]
pub struct OpenAiSummarizer {
    http_client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiSummarizer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            http_client: Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> CrawlerResult<Option<String>> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.prompt },
            ],
            response_format: ResponseFormat { kind: "json_object" },
        };

        debug!(model = %self.model, prompt_chars = request.prompt.chars().count(), "Chat completion request");

        let res = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(CrawlerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let resp: ChatCompletionResponse = res.json().await?;
        Ok(resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content))
    }
}
