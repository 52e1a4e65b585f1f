//! Pipeline wiring: the bounded page channel between crawler and indexer,
//! the one-shot crawl-done flag, and the shutdown plumbing.
//!
//! The crawl-done flag is a separate signal rather than channel closure so
//! "producer finished" and "queue drained" stay independently observable;
//! the indexer exits only when both hold.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::core::config::EngineConfig;
use crate::crawler::fetch::PageFetcher;
use crate::crawler::Crawler;
use crate::indexer::{Indexer, SharedIndex};

pub struct PipelineHandles {
    pub crawler: JoinHandle<()>,
    pub indexer: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl PipelineHandles {
    /// Signal shutdown and wait for both tasks to drain, bounded by the
    /// grace period. The crawler halts at its next batch boundary; the
    /// indexer finishes whatever is still queued.
    pub async fn shutdown(self, grace: Duration) {
        let _ = self.shutdown_tx.send(true);
        let drained = tokio::time::timeout(grace, async {
            let _ = self.crawler.await;
            let _ = self.indexer.await;
        })
        .await;
        if drained.is_err() {
            warn!("pipeline: tasks did not drain within {:?}", grace);
        }
    }
}

/// Spawn the crawler and indexer tasks, connected by a bounded PageRecord
/// channel and a crawl-done flag. Both tasks run until the crawl completes
/// naturally or [`PipelineHandles::shutdown`] is invoked.
pub fn spawn(
    config: Arc<EngineConfig>,
    fetcher: Arc<dyn PageFetcher>,
    index: SharedIndex,
) -> PipelineHandles {
    let (pages_tx, pages_rx) = mpsc::channel(config.page_queue_capacity);
    let (done_tx, done_rx) = watch::channel(false);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let crawler = Crawler::new(config.clone(), fetcher, pages_tx, done_tx, shutdown_rx);
    let indexer = Indexer::new(config.clone(), index);

    let replay = config.replay_on_start;
    let crawler_handle = tokio::spawn(crawler.start());
    let indexer_handle = tokio::spawn(async move {
        if replay {
            if let Err(e) = indexer.replay_dump().await {
                warn!("indexer: replay skipped: {:#}", e);
            }
        }
        indexer.run(pages_rx, done_rx).await;
    });

    PipelineHandles {
        crawler: crawler_handle,
        indexer: indexer_handle,
        shutdown_tx,
    }
}
