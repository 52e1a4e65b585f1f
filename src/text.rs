//! Text primitives shared by the crawler, indexer, and query processor.
//!
//! The tokeniser and stop-word set define the index's term space, so the
//! indexer and the query path must go through the same functions here;
//! a query tokenised differently from the documents would never match.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use url::Url;

/// Words too common to carry ranking signal. Never inserted into the index
/// and dropped from queries before evaluation.
pub const STOP_WORDS: [&str; 21] = [
    "a", "an", "the", "and", "or", "but", "is", "am", "are", "was", "were", "have", "has", "had",
    "of", "to", "in", "on", "for", "at", "by",
];

static STOP_WORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// ASCII alphanumeric runs; everything else is a separator.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]+").unwrap());

/// Split text into lowercase alphanumeric tokens, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token)
}

/// Canonical form of a URL used for visited-set membership and frontier dedup.
///
/// Scheme and host are lowercased (the parser does this), the fragment is
/// dropped, and a trailing `/` is stripped from non-root paths. The query
/// string is kept verbatim. Returns `None` for unparseable input.
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    url.set_fragment(None);
    let path = url.path();
    if path != "/" && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }
    Some(url.to_string())
}

/// SHA-256 hex digest of a page's extracted plain text. Pages with identical
/// bodies hash to the same doc_id and coalesce in the index.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
