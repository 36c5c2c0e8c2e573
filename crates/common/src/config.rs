use std::env;
use std::str::FromStr;
use std::time::Duration;
use anyhow::{Result, Context};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 14_7_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.2 Mobile/15E148 Safari/604.1";

/// Page lifecycle event a navigation waits for before the document is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    Load,
    DomContentLoaded,
    NetworkIdle0,
    NetworkIdle2,
}

impl WaitUntil {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitUntil::Load => "load",
            WaitUntil::DomContentLoaded => "domcontentloaded",
            WaitUntil::NetworkIdle0 => "networkidle0",
            WaitUntil::NetworkIdle2 => "networkidle2",
        }
    }
}

impl FromStr for WaitUntil {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "load" => Ok(WaitUntil::Load),
            "domcontentloaded" => Ok(WaitUntil::DomContentLoaded),
            "networkidle0" => Ok(WaitUntil::NetworkIdle0),
            "networkidle2" => Ok(WaitUntil::NetworkIdle2),
            other => anyhow::bail!("Unknown wait condition: {}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Where live-best entries sit on the listing page.
///
/// The group and list markers are plain class names tested on every node of the
/// walk; the rest are CSS selectors.
#[derive(Debug, Clone)]
pub struct ListingLayout {
    pub container_selector: String,
    pub group_class: String,
    pub list_class: String,
    pub slider_selector: String,
    pub item_selector: String,
    pub title_selector: String,
    pub link_selector: String,
    pub link_attr: String,
    /// Pattern whose first match in the link attribute is the post path.
    pub path_pattern: String,
}

impl Default for ListingLayout {
    fn default() -> Self {
        Self {
            container_selector: ".main-wrapping".to_string(),
            group_class: "grid".to_string(),
            list_class: "livebest-group".to_string(),
            slider_selector: ".thum-rtg-1-slider".to_string(),
            item_selector: "ul li".to_string(),
            title_selector: "p".to_string(),
            link_selector: "a".to_string(),
            link_attr: "href".to_string(),
            path_pattern: r"/board/[^']+".to_string(),
        }
    }
}

/// CSS selectors for a single post's page.
#[derive(Debug, Clone)]
pub struct DetailLayout {
    pub content_selector: String,
    pub paragraph_selector: String,
    pub comment_box_selector: String,
    pub comment_item_selector: String,
    pub comment_text_selector: String,
    pub comment_author_selector: String,
}

impl Default for DetailLayout {
    fn default() -> Self {
        Self {
            content_selector: ".container .brick-wid .gall-thum-btm-inner".to_string(),
            paragraph_selector: "p".to_string(),
            comment_box_selector: "#comment_box".to_string(),
            comment_item_selector: ".comment-item, .reply-item".to_string(),
            comment_text_selector: ".comment-text, .reply-text".to_string(),
            comment_author_selector: ".nick".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub base_url: String,
    pub headers: Vec<(String, String)>,
    pub wait_until: WaitUntil,
    pub timeout: Duration,
    pub posts_limit: usize,
    pub require_post_url: bool,
    pub viewport: Viewport,
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub listing: ListingLayout,
    pub detail: DetailLayout,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://m.dcinside.com".to_string(),
            headers: default_headers(DEFAULT_USER_AGENT),
            wait_until: WaitUntil::NetworkIdle0,
            timeout: Duration::from_millis(30_000),
            posts_limit: 5,
            require_post_url: true,
            viewport: Viewport { width: 1920, height: 1080 },
            browserless_url: None,
            browserless_token: None,
            listing: ListingLayout::default(),
            detail: DetailLayout::default(),
        }
    }
}

impl CrawlerConfig {
    pub fn listing_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    pub fn user_agent(&self) -> &str {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("User-Agent"))
            .map(|(_, value)| value.as_str())
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

fn default_headers(user_agent: &str) -> Vec<(String, String)> {
    [
        ("User-Agent", user_agent),
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8"),
        ("Accept-Language", "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
        ("Cache-Control", "no-cache"),
        ("Pragma", "no-cache"),
        ("Sec-Ch-Ua", "\"Not A(Brand\";v=\"99\", \"Google Chrome\";v=\"121\", \"Chromium\";v=\"121\""),
        ("Sec-Ch-Ua-Mobile", "?1"),
        ("Sec-Ch-Ua-Platform", "\"Android\""),
        ("Upgrade-Insecure-Requests", "1"),
    ]
    .iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub api_key: String,
    pub model: String,
    pub api_base_url: String,
    pub token_limit: usize,
    pub prompt_overhead: usize,
    pub chars_per_token: usize,
    pub max_group_size: usize,
    pub sample_comments: usize,
    pub max_title_chars: usize,
    pub max_content_chars: usize,
    pub max_comments: usize,
    pub max_comment_chars: usize,
}

impl AnalyzerConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            token_limit: 4_000,
            prompt_overhead: 500,
            chars_per_token: 2,
            max_group_size: 10,
            sample_comments: 5,
            max_title_chars: 100,
            max_content_chars: 1_000,
            max_comments: 5,
            max_comment_chars: 200,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub report_dir: Option<String>,
    /// Cron expression with a leading seconds field.
    pub schedule: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: None,
            schedule: "0 0 * * * *".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub analyzer: AnalyzerConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY must be set")?;

        let mut crawler = CrawlerConfig::default();
        if let Ok(base_url) = env::var("DCINSIDE_BASE_URL") {
            crawler.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Ok(user_agent) = env::var("CRAWL_USER_AGENT") {
            crawler.headers = default_headers(&user_agent);
        }
        if let Ok(wait_until) = env::var("CRAWL_WAIT_UNTIL") {
            crawler.wait_until = wait_until.parse()
                .context("CRAWL_WAIT_UNTIL must be one of load, domcontentloaded, networkidle0, networkidle2")?;
        }
        crawler.timeout = Duration::from_millis(parse_env("CRAWL_TIMEOUT_MS", 30_000u64));
        crawler.posts_limit = parse_env("CRAWL_POSTS_LIMIT", crawler.posts_limit);
        crawler.require_post_url = parse_env("CRAWL_REQUIRE_POST_URL", crawler.require_post_url);
        crawler.browserless_url = env::var("BROWSERLESS_URL").ok().filter(|s| !s.is_empty());
        crawler.browserless_token = env::var("BROWSERLESS_TOKEN").ok().filter(|s| !s.is_empty());

        let mut analyzer = AnalyzerConfig::new(&api_key);
        if let Ok(model) = env::var("OPENAI_MODEL") {
            analyzer.model = model;
        }
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            analyzer.api_base_url = base_url.trim_end_matches('/').to_string();
        }
        analyzer.token_limit = parse_env("TREND_TOKEN_LIMIT", analyzer.token_limit);
        analyzer.max_group_size = parse_env("TREND_MAX_GROUP_SIZE", analyzer.max_group_size);

        let mut output = OutputConfig::default();
        output.report_dir = env::var("TREND_REPORT_DIR").ok().filter(|s| !s.is_empty());
        if let Ok(schedule) = env::var("TREND_SCHEDULE") {
            output.schedule = schedule;
        }

        Ok(Config {
            crawler,
            analyzer,
            output,
        })
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
