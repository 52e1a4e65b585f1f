use std::sync::Arc;

use crate::core::config::EngineConfig;
use crate::indexer::SharedIndex;

/// Application state shared with the HTTP handlers.
///
/// The index is written by the indexer task only; handlers take read locks,
/// so queries observe consistent snapshots while the crawl is still running.
#[derive(Clone)]
pub struct AppState {
    pub index: SharedIndex,
    pub config: Arc<EngineConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("data_dir", &self.config.data_dir)
            .finish()
    }
}

impl AppState {
    pub fn new(index: SharedIndex, config: Arc<EngineConfig>) -> Self {
        Self { index, config }
    }
}
