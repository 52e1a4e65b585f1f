use serde::{Deserialize, Serialize};

/// One crawled page, as handed from the crawler to the indexer and as
/// serialised into the `PageModel.jsonl` crawl dump (one object per line).
///
/// `doc_id` is derived from `content` alone, so two URLs serving identical
/// bodies share a doc_id and coalesce in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub doc_id: String,
    /// Normalised URL the fetch was issued for.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    pub http_status: u16,
    pub title: String,
    /// `h1`..`h6` texts in document order, empties skipped.
    pub headings: Vec<String>,
    /// Whitespace-collapsed plain text of the body, with script/style/nav/
    /// header/footer subtrees removed.
    pub content: String,
    /// Outbound links, already filtered to HTTPS and the accepted domains.
    pub links: Vec<String>,
}

/// Doc-store entry: the displayable metadata kept per document.
/// Last write wins when a doc_id is re-ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    pub url: String,
    pub title: String,
    pub content: String,
}

/// One ranked search result as returned by `GET /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub url: String,
    pub title: String,
}

/// Query params for `GET /search?q=...`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
