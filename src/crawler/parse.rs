//! Extraction of a [`PageRecord`] from a fetched response: title, headings,
//! whitespace-collapsed body text, and filtered outbound links.

use once_cell::sync::Lazy;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::core::config::EngineConfig;
use crate::core::types::PageRecord;
use crate::crawler::fetch::{FetchError, FetchedPage};
use crate::text::content_hash;

/// Subtrees that carry chrome rather than content.
const EXCLUDED_CONTENT_TAGS: [&str; 5] = ["script", "style", "nav", "header", "footer"];

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// Turn a fetched response into a PageRecord, or classify why it must be
/// skipped. The html5ever parser behind [`Html`] is permissive and also
/// tolerates XML-shaped markup, so a single parse path serves both content
/// types the engine accepts.
pub fn build_page_record(
    page: &FetchedPage,
    config: &EngineConfig,
) -> Result<PageRecord, FetchError> {
    if page.status != 200 {
        return Err(FetchError::BadStatus(page.status));
    }

    let content_type = page.content_type.to_ascii_lowercase();
    if !content_type.contains("html") && !content_type.contains("xml") {
        return Err(FetchError::UnsupportedContentType(page.content_type.clone()));
    }

    let document = Html::parse_document(&page.body);

    let title = extract_title(&document);
    let headings = extract_headings(&document);
    let content = extract_content(&document);

    // Resolve links against the post-redirect URL so relative hrefs point
    // where the server actually served the page from.
    let links = match Url::parse(&page.final_url).or_else(|_| Url::parse(&page.url)) {
        Ok(base) => extract_links(&document, &base, config),
        Err(_) => Vec::new(),
    };

    Ok(PageRecord {
        doc_id: content_hash(&content),
        url: page.url.clone(),
        final_url: page.final_url.clone(),
        http_status: page.status,
        title,
        headings,
        content,
        links,
    })
}

/// Text of the first `<title>` element; empty string when absent.
pub fn extract_title(document: &Html) -> String {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// `h1`..`h6` texts in document order, stripped, empties skipped.
pub fn extract_headings(document: &Html) -> Vec<String> {
    document
        .select(&HEADING_SELECTOR)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Plain text of the body with script/style/nav/header/footer subtrees
/// removed, text nodes joined by single spaces, whitespace collapsed.
pub fn extract_content(document: &Html) -> String {
    let mut chunks: Vec<String> = Vec::new();
    match document.select(&BODY_SELECTOR).next() {
        Some(body) => collect_visible_text(body, &mut chunks),
        // The permissive parser synthesises <body> for HTML input; bare
        // XML-shaped documents may not have one.
        None => collect_visible_text(document.root_element(), &mut chunks),
    }
    chunks
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_visible_text(element: ElementRef<'_>, out: &mut Vec<String>) {
    if EXCLUDED_CONTENT_TAGS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_visible_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// `href` attributes of `<a>` elements, resolved against `base` and filtered
/// to HTTPS links into the accepted domains, skipping asset extensions.
pub fn extract_links(document: &Html, base: &Url, config: &EngineConfig) -> Vec<String> {
    let mut links = Vec::new();
    for element in document.select(&LINK_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            debug!("parse: unresolvable href {:?} on {}", href, base);
            continue;
        };
        if link_allowed(&resolved, config) {
            links.push(resolved.to_string());
        }
    }
    links
}

fn link_allowed(url: &Url, config: &EngineConfig) -> bool {
    if url.scheme() != "https" {
        return false;
    }

    let path = url.path().to_ascii_lowercase();
    if config.skip_extensions.iter().any(|ext| path.ends_with(ext)) {
        return false;
    }

    let Some(host) = url.host_str() else {
        return false;
    };
    config
        .accepted_domains
        .iter()
        .any(|domain| host.ends_with(domain.as_str()))
}
