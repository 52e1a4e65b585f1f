use async_trait::async_trait;
use thiserror::Error;

use crate::core::config::EngineConfig;

/// Per-URL crawl fault taxonomy. Every variant is absorbed at the batch
/// loop; a single URL's failure never halts the crawl.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeout, DNS, TLS, connection reset: anything the HTTP client raises.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-200 response; the body is not parsed and no record is emitted.
    #[error("unexpected status {0}")]
    BadStatus(u16),
    /// Content type is neither HTML nor XML.
    #[error("unsupported content type {0:?}")]
    UnsupportedContentType(String),
}

/// A raw fetched response, before parsing.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Normalised URL the request was issued for.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    /// Value of the `Content-Type` response header, possibly empty.
    pub content_type: String,
    pub body: String,
}

/// Seam between the crawler's batch loop and the network. The production
/// implementation is [`HttpFetcher`]; pipeline tests substitute an
/// in-memory fetcher so the full crawl/index/query path runs without
/// sockets.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// reqwest-backed fetcher: shared client, connection reuse, redirect
/// following, browser-like User-Agent, per-request timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &EngineConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.fetch_timeout())
            .connect_timeout(config.fetch_timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            status,
            content_type,
            body,
        })
    }
}
