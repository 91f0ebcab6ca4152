//! HTML parser for extracting links and page text
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from <a> tags and canonical links)
//! - Page title
//! - Visible text

use scraper::{Html, Node, Selector};
use thiserror::Error;
use url::Url;

/// Errors from link extraction
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    #[error("cannot resolve links against {0}")]
    InvalidBase(String),

    #[error("unparseable document: {0}")]
    Unparseable(String),
}

/// Turns a document body into absolute candidate URLs
///
/// Implementations must skip malformed hrefs individually; an `Err` means
/// the document as a whole could not be processed.
pub trait LinkExtractor: Send + Sync {
    fn extract_links(&self, body: &str, base_url: &Url) -> Result<Vec<String>, ExtractError>;
}

/// [`LinkExtractor`] backed by scraper
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &str, base_url: &Url) -> Result<Vec<String>, ExtractError> {
        parse_html(body, base_url).map(|parsed| parsed.links)
    }
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Visible text, whitespace-collapsed
    pub text: String,

    /// All links found on the page (absolute URLs)
    pub links: Vec<String>,
}

/// Parses HTML content and extracts links, title and text
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
/// - Anything that does not resolve to http(s)
///
/// # Example
///
/// ```
/// use ripple_crawl::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url).unwrap();
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> Result<ParsedPage, ExtractError> {
    if base_url.cannot_be_a_base() {
        return Err(ExtractError::InvalidBase(base_url.to_string()));
    }

    let document = Html::parse_document(html);

    Ok(ParsedPage {
        title: extract_title(&document),
        text: extract_text(&document),
        links: extract_links(&document, base_url)?,
    })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects visible text, skipping script and style contents
fn extract_text(document: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .map(|element| matches!(element.name(), "script" | "style" | "noscript" | "title"))
            .unwrap_or(false);

        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ")
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Result<Vec<String>, ExtractError> {
    let a_selector =
        Selector::parse("a[href]").map_err(|e| ExtractError::Unparseable(e.to_string()))?;
    let canonical_selector = Selector::parse("link[rel='canonical'][href]")
        .map_err(|e| ExtractError::Unparseable(e.to_string()))?;

    let mut links = Vec::new();

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(absolute_url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            links.push(absolute_url);
        }
    }

    for element in document.select(&canonical_selector) {
        if let Some(absolute_url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            links.push(absolute_url);
        }
    }

    Ok(links)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}

/// Convenience function for extracting just the links from HTML
///
/// Extraction failures yield no links.
pub fn extract_links_simple(html: &str, base_url: &Url) -> Vec<String> {
    parse_html(html, base_url)
        .map(|parsed| parsed.links)
        .unwrap_or_default()
}
