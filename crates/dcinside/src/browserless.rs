//! Rendering through a Browserless `/content` endpoint, for pages that need JavaScript.

use std::collections::BTreeMap;

use async_trait::async_trait;
use common::{CrawlerConfig, CrawlerError, CrawlerResult, Viewport};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::navigator::{header_map, transport_error, Launcher, NavigateOptions, Navigator};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest<'a> {
    url: &'a str,
    goto_options: GotoOptions,
    #[serde(rename = "setExtraHTTPHeaders")]
    set_extra_http_headers: &'a BTreeMap<String, String>,
    viewport: ViewportBody,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GotoOptions {
    wait_until: &'static str,
    timeout: u64,
}

#[derive(Serialize)]
struct ViewportBody {
    width: u32,
    height: u32,
}

pub struct BrowserlessLauncher {
    base_url: String,
    token: Option<String>,
}

impl BrowserlessLauncher {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }
}

#[async_trait]
impl Launcher for BrowserlessLauncher {
    async fn launch(&self, config: &CrawlerConfig) -> CrawlerResult<Box<dyn Navigator>> {
        // validate once so a bad header fails the launch rather than every navigation
        header_map(&config.headers)?;

        let client = Client::builder()
            .build()
            .map_err(|e| CrawlerError::BrowserLaunch(e.to_string()))?;

        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        info!("Browserless session ready at {}", self.base_url);
        Ok(Box::new(BrowserlessNavigator {
            client: Some(client),
            endpoint,
            headers: config.headers.iter().cloned().collect(),
            viewport: config.viewport,
        }))
    }
}

pub struct BrowserlessNavigator {
    client: Option<Client>,
    endpoint: String,
    headers: BTreeMap<String, String>,
    viewport: Viewport,
}

impl BrowserlessNavigator {
    fn request_body<'a>(&'a self, url: &'a str, options: &NavigateOptions) -> ContentRequest<'a> {
        ContentRequest {
            url,
            goto_options: GotoOptions {
                wait_until: options.wait_until.as_str(),
                timeout: options.timeout_ms(),
            },
            set_extra_http_headers: &self.headers,
            viewport: ViewportBody {
                width: self.viewport.width,
                height: self.viewport.height,
            },
        }
    }
}

#[async_trait]
impl Navigator for BrowserlessNavigator {
    async fn navigate(&mut self, url: &str, options: &NavigateOptions) -> CrawlerResult<String> {
        let client = self.client.as_ref().ok_or(CrawlerError::NotInitialized)?;
        debug!(url, wait_until = options.wait_until.as_str(), "Rendering via Browserless");

        let resp = client
            .post(&self.endpoint)
            .timeout(options.timeout)
            .json(&self.request_body(url, options))
            .send()
            .await
            .map_err(|e| transport_error(url, options, e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(CrawlerError::Navigation {
                url: url.to_string(),
                message: format!("Browserless status {}: {}", status.as_u16(), message),
            });
        }

        resp.text().await.map_err(|e| transport_error(url, options, e))
    }

    async fn close(&mut self) -> CrawlerResult<()> {
        if self.client.take().is_some() {
            info!("Browserless session closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_launch_and_request_body() {
        let launcher = BrowserlessLauncher::new("http://localhost:3000/", Some("secret"));
        let config = CrawlerConfig::default();
        let _ = launcher.launch(&config).await.unwrap();

        let navigator = BrowserlessNavigator {
            client: None,
            endpoint: "http://localhost:3000/content?token=secret".to_string(),
            headers: config.headers.iter().cloned().collect(),
            viewport: config.viewport,
        };
        let options = NavigateOptions::from_config(&config);
        let body = serde_json::to_value(navigator.request_body("https://m.dcinside.com/", &options)).unwrap();

        assert_eq!(body["url"], "https://m.dcinside.com/");
        assert_eq!(body["gotoOptions"]["waitUntil"], "networkidle0");
        assert_eq!(body["gotoOptions"]["timeout"], 30_000);
        assert_eq!(body["viewport"]["width"], 1920);
        assert_eq!(body["setExtraHTTPHeaders"]["Pragma"], "no-cache");
    }

    #[tokio::test]
    async fn test_launch_rejects_invalid_headers() {
        let launcher = BrowserlessLauncher::new("http://localhost:3000", None);
        let mut config = CrawlerConfig::default();
        config.headers.push(("X-Bad".to_string(), "line\nbreak".to_string()));
        assert!(matches!(launcher.launch(&config).await, Err(CrawlerError::BrowserLaunch(_))));
    }
}
