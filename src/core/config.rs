use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// EngineConfig: file-based config loader (webdex.json) with env-var fallback
// ---------------------------------------------------------------------------

/// Immutable engine configuration, shared by the crawler, indexer, and query
/// processor. Loaded once at startup; components receive it by `Arc` rather
/// than reading process-wide mutable state.
#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct EngineConfig {
    /// URLs the frontier starts with.
    pub seed_urls: Vec<String>,
    /// Frontier capacity AND hard cap on the number of visited URLs.
    pub max_limit: usize,
    /// URLs fetched concurrently per crawl iteration.
    pub batch_size: usize,
    /// Host suffixes the crawler is allowed to follow links into.
    pub accepted_domains: Vec<String>,
    /// Links whose path ends with one of these extensions are never enqueued.
    pub skip_extensions: Vec<String>,
    /// Maximum number of results a query returns.
    pub response_size: usize,
    /// Postings scanned per term when backfilling with OR candidates.
    pub top_k_per_term: usize,
    /// Capacity of the crawler → indexer page channel. When full, the
    /// crawler blocks, which bounds how far ahead of the indexer it runs.
    pub page_queue_capacity: usize,
    /// Per-request fetch timeout, seconds.
    pub fetch_timeout_secs: u64,
    /// Grace period for draining the pipeline on shutdown, seconds.
    pub shutdown_timeout_secs: u64,
    pub port: u16,
    /// Directory holding the crawl dump and the persisted index files.
    pub data_dir: PathBuf,
    pub user_agent: String,
    /// Rebuild the in-memory index from an existing crawl dump before
    /// consuming live records.
    pub replay_on_start: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed_urls: vec!["https://en.wikipedia.org/wiki/Main_Page".to_string()],
            max_limit: 10_000,
            batch_size: 20,
            accepted_domains: vec!["wikipedia.org".to_string(), "en.wikipedia.org".to_string()],
            skip_extensions: [
                ".css", ".js", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".woff",
                ".woff2", ".ttf", ".pdf",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            response_size: 10,
            top_k_per_term: 50,
            page_queue_capacity: 64,
            fetch_timeout_secs: 10,
            shutdown_timeout_secs: 30,
            port: 5000,
            data_dir: PathBuf::from("data"),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            replay_on_start: false,
        }
    }
}

impl EngineConfig {
    /// Load `webdex.json` from standard locations.
    ///
    /// Search order (first found wins):
    /// 1. `WEBDEX_CONFIG` env var path
    /// 2. `./webdex.json` (process cwd)
    /// 3. `../webdex.json` (one level up, when running from a subdirectory)
    ///
    /// Missing file → `EngineConfig::default()` (silent).
    /// Parse error → log a warning, return `EngineConfig::default()`.
    pub fn load() -> EngineConfig {
        let candidates: Vec<PathBuf> = {
            let mut v = vec![PathBuf::from("webdex.json"), PathBuf::from("../webdex.json")];
            if let Ok(env_path) = std::env::var("WEBDEX_CONFIG") {
                v.insert(0, PathBuf::from(env_path));
            }
            v
        };

        for path in &candidates {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<EngineConfig>(&contents) {
                    Ok(cfg) => {
                        tracing::info!("webdex.json loaded from {}", path.display());
                        return cfg.with_env_overrides();
                    }
                    Err(e) => {
                        tracing::warn!(
                            "webdex.json parse error at {}: {} — using defaults",
                            path.display(),
                            e
                        );
                        return EngineConfig::default().with_env_overrides();
                    }
                },
                Err(_) => continue, // not found at this path, try next
            }
        }

        EngineConfig::default().with_env_overrides()
    }

    /// Apply env-var overrides on top of whatever the file (or defaults)
    /// provided: `WEBDEX_PORT`/`PORT` and `WEBDEX_DATA_DIR`.
    fn with_env_overrides(mut self) -> Self {
        for key in ["WEBDEX_PORT", "PORT"] {
            if let Ok(v) = std::env::var(key) {
                if let Ok(p) = v.trim().parse::<u16>() {
                    self.port = p;
                    break;
                }
            }
        }
        if let Ok(dir) = std::env::var("WEBDEX_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// `data/PageModel.jsonl`: one PageRecord per line, appended as pages
    /// are crawled.
    pub fn page_dump_path(&self) -> PathBuf {
        self.data_dir.join("PageModel.jsonl")
    }

    /// `data/inverted_index.json`: `{ term: { doc_id: score } }`.
    pub fn inverted_index_path(&self) -> PathBuf {
        self.data_dir.join("inverted_index.json")
    }

    /// `data/doc_store.json`: `{ doc_id: { url, title, content } }`.
    pub fn doc_store_path(&self) -> PathBuf {
        self.data_dir.join("doc_store.json")
    }
}
