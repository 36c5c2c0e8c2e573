use std::time::Duration;

use async_trait::async_trait;
use common::{CrawlerConfig, CrawlerError, CrawlerResult, WaitUntil};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    pub wait_until: WaitUntil,
    pub timeout: Duration,
}

impl NavigateOptions {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            wait_until: config.wait_until,
            timeout: config.timeout,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// A single page of a rendering session. Navigations on one page are sequential.
#[async_trait]
pub trait Navigator: Send {
    /// Loads `url` and returns the rendered HTML.
    async fn navigate(&mut self, url: &str, options: &NavigateOptions) -> CrawlerResult<String>;
    async fn close(&mut self) -> CrawlerResult<()>;
}

/// Starts rendering sessions.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, config: &CrawlerConfig) -> CrawlerResult<Box<dyn Navigator>>;
}

pub(crate) fn header_map(headers: &[(String, String)]) -> CrawlerResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| CrawlerError::BrowserLaunch(format!("Invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| CrawlerError::BrowserLaunch(format!("Invalid header value for {}: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

pub(crate) fn transport_error(url: &str, options: &NavigateOptions, err: reqwest::Error) -> CrawlerError {
    if err.is_timeout() {
        CrawlerError::Timeout {
            url: url.to_string(),
            timeout_ms: options.timeout_ms(),
        }
    } else {
        CrawlerError::Navigation {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Fetches server-rendered HTML directly, without a browser.
pub struct HttpLauncher;

#[async_trait]
impl Launcher for HttpLauncher {
    async fn launch(&self, config: &CrawlerConfig) -> CrawlerResult<Box<dyn Navigator>> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .default_headers(header_map(&config.headers)?)
            .build()
            .map_err(|e| CrawlerError::BrowserLaunch(e.to_string()))?;

        info!("HTTP session ready");
        Ok(Box::new(HttpNavigator { client: Some(client) }))
    }
}

pub struct HttpNavigator {
    client: Option<Client>,
}

#[async_trait]
impl Navigator for HttpNavigator {
    async fn navigate(&mut self, url: &str, options: &NavigateOptions) -> CrawlerResult<String> {
        let client = self.client.as_ref().ok_or(CrawlerError::NotInitialized)?;
        debug!(url, wait_until = options.wait_until.as_str(), "Navigating");

        let response = client
            .get(url)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| transport_error(url, options, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlerError::Navigation {
                url: url.to_string(),
                message: format!("HTTP status {}", status),
            });
        }

        response.text().await.map_err(|e| transport_error(url, options, e))
    }

    async fn close(&mut self) -> CrawlerResult<()> {
        self.client = None;
        Ok(())
    }
}
