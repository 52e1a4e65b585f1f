//! Frontier-driven batch crawler.
//!
//! One task owns the frontier and the visited set outright; nothing here is
//! shared. Each iteration drains up to a batch of URLs from the frontier,
//! fetches them concurrently over the shared [`PageFetcher`], parses the
//! survivors, hands the records to the indexer over the bounded page
//! channel (blocking when the indexer falls behind), and feeds extracted
//! links back into the frontier under its capacity policy.

pub mod fetch;
pub mod parse;

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::core::config::EngineConfig;
use crate::core::types::PageRecord;
use crate::indexer::persist::PageDump;
use crate::text::normalize_url;
use fetch::PageFetcher;

pub struct Crawler {
    config: Arc<EngineConfig>,
    fetcher: Arc<dyn PageFetcher>,
    /// URLs awaiting fetch, bounded by `max_limit`.
    frontier: VecDeque<String>,
    /// Normalised URLs that have been picked up for fetching at least once.
    /// Membership is checked at dequeue (required) and at enqueue (cheap).
    visited: HashSet<String>,
    pages_tx: mpsc::Sender<PageRecord>,
    crawl_done: watch::Sender<bool>,
    shutdown: watch::Receiver<bool>,
    dump: PageDump,
}

impl Crawler {
    pub fn new(
        config: Arc<EngineConfig>,
        fetcher: Arc<dyn PageFetcher>,
        pages_tx: mpsc::Sender<PageRecord>,
        crawl_done: watch::Sender<bool>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let frontier: VecDeque<String> = config.seed_urls.iter().cloned().collect();
        let dump = PageDump::new(config.page_dump_path());
        Self {
            config,
            fetcher,
            frontier,
            visited: HashSet::new(),
            pages_tx,
            crawl_done,
            shutdown,
            dump,
        }
    }

    /// Run the crawl to completion: loops until the frontier is exhausted,
    /// the visited cap is reached, or shutdown is signalled, then sets the
    /// crawl-done flag so the indexer can drain and exit.
    pub async fn start(mut self) {
        info!(
            "crawler: starting with {} seed URL(s), max_limit={}, batch_size={}",
            self.frontier.len(),
            self.config.max_limit,
            self.config.batch_size
        );

        loop {
            if *self.shutdown.borrow() {
                info!("crawler: shutdown signalled, stopping");
                break;
            }
            if self.frontier.is_empty() {
                info!("crawler: frontier exhausted");
                break;
            }
            if self.visited.len() >= self.config.max_limit {
                info!("crawler: visited cap {} reached", self.config.max_limit);
                break;
            }

            let batch = self.next_batch();
            if batch.is_empty() {
                // Everything drained this round was already visited.
                continue;
            }
            debug!("crawler: fetching batch of {}", batch.len());

            let responses =
                futures::future::join_all(batch.iter().map(|url| self.fetcher.fetch(url))).await;

            for (url, response) in batch.iter().zip(responses) {
                let page = match response {
                    Ok(page) => page,
                    Err(e) => {
                        debug!("crawler: skipping {}: {}", url, e);
                        continue;
                    }
                };
                let record = match parse::build_page_record(&page, &self.config) {
                    Ok(record) => record,
                    Err(e) => {
                        debug!("crawler: skipping {}: {}", url, e);
                        continue;
                    }
                };

                let links = record.links.clone();
                self.dump.append(&record);

                // Backpressure: blocks while the page queue is full.
                if self.pages_tx.send(record).await.is_err() {
                    warn!("crawler: page queue closed, stopping");
                    let _ = self.crawl_done.send(true);
                    return;
                }

                self.enqueue_links(&links);
            }
        }

        info!("crawler: finished, {} URL(s) visited", self.visited.len());
        let _ = self.crawl_done.send(true);
    }

    /// Drain up to `batch_size` URLs off the frontier: normalise, drop
    /// already-visited entries, and mark the rest visited before the fetch
    /// is even issued so no URL can be picked up twice. Once another
    /// admission would cross the visited cap, the remaining drained URLs
    /// are discarded; the cap ends the crawl.
    fn next_batch(&mut self) -> Vec<String> {
        let mut batch = Vec::new();
        while let Some(raw) = self.frontier.pop_front() {
            if batch.len() >= self.config.batch_size {
                self.frontier.push_front(raw);
                break;
            }
            let Some(url) = normalize_url(&raw) else {
                debug!("crawler: dropping unparseable frontier URL {:?}", raw);
                continue;
            };
            if self.visited.contains(&url) {
                debug!("crawler: {} already visited, skipping", url);
                continue;
            }
            if self.visited.len() >= self.config.max_limit {
                continue;
            }
            self.visited.insert(url.clone());
            batch.push(url);
        }
        batch
    }

    /// Frontier admission policy: with `available = max_limit − |frontier|`,
    /// silently drop everything when no room remains, otherwise consider
    /// only the first `available` links, normalise them, and drop any that
    /// were already visited.
    fn enqueue_links(&mut self, links: &[String]) {
        let available = self.config.max_limit.saturating_sub(self.frontier.len());
        if available == 0 {
            debug!("crawler: frontier full, dropping {} link(s)", links.len());
            return;
        }
        for raw in links.iter().take(available) {
            let Some(url) = normalize_url(raw) else {
                continue;
            };
            if self.visited.contains(&url) {
                continue;
            }
            self.frontier.push_back(url);
        }
    }
}
