pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod text;

pub use config::{AnalyzerConfig, Config, CrawlerConfig, DetailLayout, ListingLayout, OutputConfig, Viewport, WaitUntil};
pub use crawler::Crawler;
pub use error::{CrawlerError, CrawlerResult};
pub use models::{Comment, CrawlOutput, PartialResult, Post, PostTitle, Sentiment, TrendResult, ANALYSIS_FAILED};
pub use text::{normalize, truncate_chars};
