use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Browser session is not initialized; call initialize() first")]
    NotInitialized,

    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrawlerError {
    /// Errors raised while talking to the rendering collaborator.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            CrawlerError::Navigation { .. }
                | CrawlerError::Timeout { .. }
                | CrawlerError::BrowserLaunch(_)
        )
    }
}

pub type CrawlerResult<T> = Result<T, CrawlerError>;
