use std::collections::HashSet;

use common::{normalize, Comment, CrawlerConfig, CrawlerError, CrawlerResult, Post};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::dom::{has_class, preorder, selector, text_of};

/// Pulls live-best entries out of the listing page.
pub struct ListingExtractor {
    container: Selector,
    group_class: String,
    list_class: String,
    slider: Selector,
    item: Selector,
    title: Selector,
    link: Selector,
    link_attr: String,
    path_pattern: Regex,
    base_url: String,
    require_url: bool,
}

impl ListingExtractor {
    pub fn new(config: &CrawlerConfig) -> CrawlerResult<Self> {
        let layout = &config.listing;
        let path_pattern = Regex::new(&layout.path_pattern)
            .map_err(|e| CrawlerError::Parse(format!("Invalid post path pattern: {}", e)))?;

        Ok(Self {
            container: selector(&layout.container_selector)?,
            group_class: layout.group_class.clone(),
            list_class: layout.list_class.clone(),
            slider: selector(&layout.slider_selector)?,
            item: selector(&layout.item_selector)?,
            title: selector(&layout.title_selector)?,
            link: selector(&layout.link_selector)?,
            link_attr: layout.link_attr.clone(),
            path_pattern,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            require_url: config.require_post_url,
        })
    }

    /// Raw posts in traversal order. Nested or repeated groups yield
    /// duplicates; deduplication happens later.
    pub fn extract(&self, doc: &Html) -> Vec<Post> {
        let mut posts = Vec::new();

        for container in doc.select(&self.container) {
            for node in preorder(container) {
                if !(has_class(node, &self.group_class) && has_class(node, &self.list_class)) {
                    continue;
                }
                for slider in node.select(&self.slider) {
                    posts.extend(slider.select(&self.item).filter_map(|item| self.extract_item(item)));
                }
            }
        }

        debug!("Extracted {} raw posts from listing", posts.len());
        posts
    }

    fn extract_item(&self, item: ElementRef<'_>) -> Option<Post> {
        let title = item.select(&self.title).next().map(text_of).unwrap_or_default();
        if title.is_empty() {
            return None;
        }

        let url = item
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr(&self.link_attr))
            .and_then(|href| self.post_url(href));

        if url.is_none() && self.require_url {
            debug!("Skipping '{}': no post link", title);
            return None;
        }

        Some(Post::new(title, url))
    }

    /// Rewrites the path found inside a raw link attribute into an absolute URL.
    pub fn post_url(&self, href: &str) -> Option<String> {
        self.path_pattern
            .find(href)
            .map(|m| format!("{}{}", self.base_url, m.as_str()))
    }
}

/// Body text and comments of one post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDetail {
    pub content: Option<String>,
    pub comments: Vec<Comment>,
}

pub struct DetailExtractor {
    content: Selector,
    paragraph: Selector,
    comment_box: Selector,
    comment_item: Selector,
    comment_text: Selector,
    comment_author: Selector,
}

impl DetailExtractor {
    pub fn new(config: &CrawlerConfig) -> CrawlerResult<Self> {
        let layout = &config.detail;
        Ok(Self {
            content: selector(&layout.content_selector)?,
            paragraph: selector(&layout.paragraph_selector)?,
            comment_box: selector(&layout.comment_box_selector)?,
            comment_item: selector(&layout.comment_item_selector)?,
            comment_text: selector(&layout.comment_text_selector)?,
            comment_author: selector(&layout.comment_author_selector)?,
        })
    }

    pub fn extract(&self, doc: &Html) -> PostDetail {
        PostDetail {
            content: self.content(doc),
            comments: self.comments(doc),
        }
    }

    fn content(&self, doc: &Html) -> Option<String> {
        let scope = doc.select(&self.content).next()?;

        let paragraphs = scope
            .select(&self.paragraph)
            .map(text_of)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>();

        let content = normalize(&paragraphs.join(" "));
        (!content.is_empty()).then_some(content)
    }

    fn comments(&self, doc: &Html) -> Vec<Comment> {
        let Some(comment_box) = doc.select(&self.comment_box).next() else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut comments = Vec::new();

        for item in comment_box.select(&self.comment_item) {
            let Some(text_node) = item.select(&self.comment_text).next() else {
                continue;
            };
            let content = text_of(text_node);
            if content.is_empty() || !seen.insert(content.clone()) {
                continue;
            }

            let author = item
                .select(&self.comment_author)
                .next()
                .map(text_of)
                .filter(|nick| !nick.is_empty());

            comments.push(Comment { content, author });
        }

        comments
    }
}
