pub mod core;
pub mod crawler;
pub mod indexer;
pub mod pipeline;
pub mod query;
pub mod text;

// --- Primary core exports ---
pub use core::types;
pub use core::types::*;
pub use core::AppState;
pub use core::config::EngineConfig;

// --- Component exports ---
pub use crawler::fetch::{FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use crawler::Crawler;
pub use indexer::{Indexer, InvertedIndex, SearchIndex, SharedIndex};
