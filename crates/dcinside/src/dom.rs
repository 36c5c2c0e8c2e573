//! Helpers over scraper's parsed tree.
//!
//! Walks use an explicit stack, so nesting depth is never bounded by the call
//! stack, and always visit elements in document (pre-)order.

use std::time::Duration;

use common::{normalize, CrawlerError, CrawlerResult};
use scraper::{ElementRef, Html, Selector};

pub fn selector(css: &str) -> CrawlerResult<Selector> {
    Selector::parse(css).map_err(|e| CrawlerError::Parse(format!("Invalid selector {}: {}", css, e)))
}

pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Normalized text of `element` and all its descendants.
pub fn text_of(element: ElementRef<'_>) -> String {
    normalize(&element.text().collect::<String>())
}

/// Pre-order walk over `start` and every element below it.
pub fn preorder(start: ElementRef<'_>) -> Preorder<'_> {
    Preorder { stack: vec![start] }
}

pub struct Preorder<'a> {
    stack: Vec<ElementRef<'a>>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = ElementRef<'a>;

    fn next(&mut self) -> Option<ElementRef<'a>> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children().rev().filter_map(ElementRef::wrap));
        Some(element)
    }
}

/// Parses `html` and runs `extractor` over it off the async runtime, bounded by `timeout`.
pub async fn evaluate<T, F>(html: String, url: &str, timeout: Duration, extractor: F) -> CrawlerResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Html) -> T + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || extractor(&Html::parse_document(&html)));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(CrawlerError::Parse(format!("Evaluating {} failed: {}", url, e))),
        Err(_) => Err(CrawlerError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div id="a" class="x y"><p>one</p><div class="x"><p>two</p></div></div>
        <section><span class="x">three</span></section>
    </body></html>"#;

    #[test]
    fn test_preorder_visits_nested_matches_in_document_order() {
        let doc = Html::parse_document(PAGE);
        let xs: Vec<String> = preorder(doc.root_element())
            .filter(|el| has_class(*el, "x"))
            .map(text_of)
            .collect();
        assert_eq!(xs, vec!["onetwo", "two", "three"]);
    }

    #[test]
    fn test_preorder_includes_start() {
        let doc = Html::parse_document(PAGE);
        let outer = doc.select(&selector("#a").unwrap()).next().unwrap();
        let tags: Vec<&str> = preorder(outer).map(|el| el.value().name()).collect();
        assert_eq!(tags, vec!["div", "p", "div", "p"]);
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(selector("div["), Err(CrawlerError::Parse(_))));
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let depth = 1_000;
        let html = format!("{}<p class=\"leaf\">deep</p>{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let doc = Html::parse_document(&html);
        let leaf = preorder(doc.root_element()).find(|el| has_class(*el, "leaf")).unwrap();
        assert_eq!(text_of(leaf), "deep");
    }

    #[tokio::test]
    async fn test_evaluate_runs_extractor() {
        let paragraphs = selector("p").unwrap();
        let count = evaluate(PAGE.to_string(), "mem://page", Duration::from_secs(5), move |doc| {
            doc.select(&paragraphs).count()
        })
        .await
        .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_evaluate_times_out() {
        let err = evaluate(PAGE.to_string(), "mem://slow", Duration::from_millis(10), |_doc| {
            std::thread::sleep(Duration::from_millis(200));
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CrawlerError::Timeout { ref url, timeout_ms: 10 } if url == "mem://slow"));
    }
}
