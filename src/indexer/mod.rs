//! Streaming indexer: consumes PageRecords off the page channel, folds them
//! into the weighted inverted index and the doc store, and persists both
//! after every ingestion.

pub mod persist;

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, RwLock};
use tracing::{debug, error, info};

use crate::core::config::EngineConfig;
use crate::core::types::{DocEntry, PageRecord};
use crate::text::{is_stop_word, tokenize};

/// Field weights applied to raw term frequencies.
const CONTENT_WEIGHT: u64 = 1;
const HEADING_WEIGHT: u64 = 4;
const TITLE_WEIGHT: u64 = 8;

/// How long the consume loop waits for a record before re-checking the
/// crawl-done flag.
const RECV_TIMEOUT: Duration = Duration::from_millis(500);

/// term → doc_id → accumulated weighted score.
pub type InvertedIndex = HashMap<String, HashMap<String, u64>>;

/// doc_id → displayable metadata; last write wins.
pub type DocStore = HashMap<String, DocEntry>;

/// The in-memory search index: written by the indexer task, read by query
/// handlers through [`SharedIndex`].
#[derive(Debug, Default)]
pub struct SearchIndex {
    pub inverted: InvertedIndex,
    pub docs: DocStore,
}

pub type SharedIndex = Arc<RwLock<SearchIndex>>;

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedIndex {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Fold one PageRecord into the index.
    ///
    /// Each of the three fields is tokenised, stop-word filtered, and its
    /// term frequencies scaled by the field weight; the summed per-term
    /// scores merge *additively* into the postings, so a doc_id that is
    /// re-ingested (same body reachable from several URLs) accumulates.
    /// The doc store entry is replaced outright.
    pub fn apply(&mut self, record: &PageRecord) {
        let mut term_scores: HashMap<String, u64> = HashMap::new();
        accumulate_field(&record.content, CONTENT_WEIGHT, &mut term_scores);
        accumulate_field(&record.headings.join(" "), HEADING_WEIGHT, &mut term_scores);
        accumulate_field(&record.title, TITLE_WEIGHT, &mut term_scores);

        for (term, score) in term_scores {
            *self
                .inverted
                .entry(term)
                .or_default()
                .entry(record.doc_id.clone())
                .or_insert(0) += score;
        }

        self.docs.insert(
            record.doc_id.clone(),
            DocEntry {
                url: record.final_url.clone(),
                title: record.title.clone(),
                content: record.content.clone(),
            },
        );
    }

    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }

    pub fn term_count(&self) -> usize {
        self.inverted.len()
    }
}

fn accumulate_field(text: &str, weight: u64, term_scores: &mut HashMap<String, u64>) {
    for token in tokenize(text) {
        if is_stop_word(&token) {
            continue;
        }
        *term_scores.entry(token).or_insert(0) += weight;
    }
}

pub struct Indexer {
    config: Arc<EngineConfig>,
    index: SharedIndex,
}

impl Indexer {
    pub fn new(config: Arc<EngineConfig>, index: SharedIndex) -> Self {
        Self { config, index }
    }

    /// Consume loop: waits for records with a short timeout; on timeout,
    /// exits iff the crawl-done flag is set AND the queue is empty (checked
    /// by a non-blocking drain, so records that raced in still get indexed).
    pub async fn run(self, mut pages_rx: mpsc::Receiver<PageRecord>, crawl_done: watch::Receiver<bool>) {
        info!("indexer: ready");
        let mut indexed = 0usize;

        loop {
            match tokio::time::timeout(RECV_TIMEOUT, pages_rx.recv()).await {
                Ok(Some(record)) => {
                    self.ingest(record).await;
                    indexed += 1;
                }
                // Channel closed and drained; nothing more can arrive.
                Ok(None) => break,
                Err(_) => {
                    if *crawl_done.borrow() {
                        match pages_rx.try_recv() {
                            Ok(record) => {
                                self.ingest(record).await;
                                indexed += 1;
                            }
                            Err(_) => break,
                        }
                    }
                }
            }
        }

        info!("indexer: stopped after {} record(s)", indexed);
    }

    /// Update the shared index with one record, then rewrite both persisted
    /// files. A persistence failure is surfaced at error level but keeps
    /// the in-memory index serving.
    async fn ingest(&self, record: PageRecord) {
        debug!("indexer: ingesting doc_id={} from {}", record.doc_id, record.final_url);
        {
            let mut index = self.index.write().await;
            index.apply(&record);
        }
        let index = self.index.read().await;
        self.persist(&index);
    }

    fn persist(&self, index: &SearchIndex) {
        if let Err(e) = persist::write_json_atomic(&self.config.inverted_index_path(), &index.inverted)
        {
            error!("indexer: failed to persist inverted index: {:#}", e);
        }
        if let Err(e) = persist::write_json_atomic(&self.config.doc_store_path(), &index.docs) {
            error!("indexer: failed to persist doc store: {:#}", e);
        }
    }

    /// Rebuild the in-memory index from an existing `PageModel.jsonl` crawl
    /// dump. Bad JSON lines and lines that don't deserialise into a
    /// PageRecord are counted and skipped. Persists once at the end.
    pub async fn replay_dump(&self) -> anyhow::Result<(usize, usize)> {
        let path = self.config.page_dump_path();
        let file = std::fs::File::open(&path)
            .map_err(|e| anyhow::anyhow!("opening {}: {}", path.display(), e))?;
        let reader = std::io::BufReader::new(file);

        let mut indexed = 0usize;
        let mut skipped = 0usize;

        let mut index = self.index.write().await;
        for (line_no, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    debug!("indexer: unreadable dump line {}: {}", line_no + 1, e);
                    skipped += 1;
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<PageRecord>(&line) {
                Ok(record) => {
                    index.apply(&record);
                    indexed += 1;
                }
                Err(e) => {
                    debug!("indexer: skipping dump line {}: {}", line_no + 1, e);
                    skipped += 1;
                }
            }
        }
        drop(index);

        let index = self.index.read().await;
        self.persist(&index);

        info!("indexer: replayed {} record(s), skipped {}", indexed, skipped);
        Ok((indexed, skipped))
    }
}
