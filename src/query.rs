//! Ranked query evaluation: AND-intersection first, OR backfill when the
//! intersection is smaller than the requested result size.
//!
//! Pure reads over [`SearchIndex`]: evaluation never mutates the index, so
//! it can run under a read lock while the indexer is still ingesting.

use std::collections::{HashMap, HashSet};

use crate::core::config::EngineConfig;
use crate::core::types::SearchHit;
use crate::indexer::SearchIndex;
use crate::text::{is_stop_word, tokenize};

/// Evaluate `query` against the index and shape the ranked results from the
/// doc store.
///
/// Tokens are stop-word filtered and deduplicated; tokens absent from the
/// index are ignored. Matched postings are intersected smallest-first with
/// an early exit, the intersection is ranked by summed per-token score, and
/// any remaining slots are backfilled from the top-`top_k_per_term` OR
/// candidates. All orderings break score ties by ascending doc_id, so the
/// same query against an unchanged index always yields identical output.
pub fn generate_response(query: &str, index: &SearchIndex, config: &EngineConfig) -> Vec<SearchHit> {
    let mut tokens: Vec<String> = Vec::new();
    let mut seen_tokens: HashSet<String> = HashSet::new();
    for token in tokenize(query) {
        if is_stop_word(&token) || seen_tokens.contains(&token) {
            continue;
        }
        seen_tokens.insert(token.clone());
        tokens.push(token);
    }

    // Posting lookup; keep only tokens that matched something.
    let mut matched: Vec<(&str, &HashMap<String, u64>)> = tokens
        .iter()
        .filter_map(|token| {
            index
                .inverted
                .get(token.as_str())
                .map(|posting| (token.as_str(), posting))
        })
        .collect();
    if matched.is_empty() {
        return Vec::new();
    }

    // Smallest posting first; the stable sort keeps query order for equal
    // sizes, so intersection work is deterministic too.
    matched.sort_by_key(|(_, posting)| posting.len());

    // Fold the intersection from the smallest posting, bailing as soon as
    // it empties.
    let mut common: HashSet<&String> = matched[0].1.keys().collect();
    for (_, posting) in &matched[1..] {
        common.retain(|doc_id| posting.contains_key(*doc_id));
        if common.is_empty() {
            break;
        }
    }

    let mut selected: Vec<String> = Vec::new();
    let mut selected_set: HashSet<String> = HashSet::new();

    if !common.is_empty() {
        let mut and_ranked: Vec<(&String, u64)> = common
            .iter()
            .map(|doc_id| {
                let score: u64 = matched
                    .iter()
                    .map(|(_, posting)| posting.get(*doc_id).copied().unwrap_or(0))
                    .sum();
                (*doc_id, score)
            })
            .collect();
        and_ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        for (doc_id, _) in and_ranked.into_iter().take(config.response_size) {
            selected.push(doc_id.clone());
            selected_set.insert(doc_id.clone());
        }
    }

    if selected.len() < config.response_size {
        // OR backfill: accumulate each token's top postings into one
        // candidate pool, then take the best not-yet-selected docs.
        let mut or_scores: HashMap<&String, u64> = HashMap::new();
        for (_, posting) in &matched {
            for (doc_id, score) in top_k_postings(posting, config.top_k_per_term) {
                *or_scores.entry(doc_id).or_insert(0) += score;
            }
        }

        let mut pool: Vec<(&String, u64)> = or_scores.into_iter().collect();
        pool.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        for (doc_id, _) in pool {
            if selected.len() >= config.response_size {
                break;
            }
            if selected_set.contains(doc_id) {
                continue;
            }
            selected.push(doc_id.clone());
            selected_set.insert(doc_id.clone());
        }
    }

    // Shape results; a doc_id missing from the doc store is skipped
    // silently.
    selected
        .iter()
        .filter_map(|doc_id| {
            index.docs.get(doc_id).map(|entry| SearchHit {
                doc_id: doc_id.clone(),
                url: entry.url.clone(),
                title: entry.title.clone(),
            })
        })
        .collect()
}

/// A posting's top `k` entries by score, ties broken by ascending doc_id.
fn top_k_postings(posting: &HashMap<String, u64>, k: usize) -> Vec<(&String, u64)> {
    let mut entries: Vec<(&String, u64)> = posting.iter().map(|(d, s)| (d, *s)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(k);
    entries
}
