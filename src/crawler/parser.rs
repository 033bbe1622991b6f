//! HTML parser for extracting links
//!
//! This module turns a fetched HTML body into the raw `href` strings of its
//! anchors. Resolution, canonicalization and scope checks happen in the
//! coordinator.

use scraper::{Html, Selector};

/// The link-extraction collaborator of the crawl engine
pub trait LinkExtractor: Send + Sync {
    /// Returns the raw href strings found in an HTML body, in document order
    fn extract(&self, body: &str) -> Vec<String>;
}

/// `LinkExtractor` that reads `<a href>` elements with scraper
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, body: &str) -> Vec<String> {
        extract_links(body)
    }
}

/// Extracts raw hrefs from `<a href="...">` elements
///
/// # Link Extraction Rules
///
/// **Include:**
/// - every `<a href="...">`, relative or absolute, untouched
///
/// **Exclude:**
/// - empty hrefs
/// - fragment-only hrefs (same page anchors)
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
///
/// # Example
///
/// ```
/// use sitemapper::crawler::extract_links;
///
/// let html = r#"<html><body><a href="/page.html">Link</a></body></html>"#;
/// assert_eq!(extract_links(html), vec!["/page.html".to_string()]);
/// ```
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if is_followable(href) {
                    links.push(href.to_string());
                }
            }
        }
    }

    links
}

/// Returns false for hrefs that can never name another page
fn is_followable(href: &str) -> bool {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !(lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:"))
}
