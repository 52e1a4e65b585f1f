use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use webdex::{pipeline, query, types::*, AppState, EngineConfig, HttpFetcher, SearchIndex};

/// Ceiling on how long a query handler waits for the index read lock; a
/// wedged writer turns into a 500 instead of a hung request.
const QUERY_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting webdex");

    let mut config = EngineConfig::load();
    if std::env::args().any(|a| a == "--replay") {
        config.replay_on_start = true;
    }
    let config = Arc::new(config);

    let fetcher = Arc::new(HttpFetcher::from_config(&config)?);
    let index = SearchIndex::shared();
    let state = AppState::new(index.clone(), config.clone());

    // Crawler and indexer run for the life of the process; the HTTP front
    // end serves queries against the index while it is still being built.
    let handles = pipeline::spawn(config.clone(), fetcher, index);

    // Build router
    let app = Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/search", get(search_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            anyhow::bail!(
                "Address already in use: {}. Stop the existing process or set WEBDEX_PORT/PORT.",
                bind_addr
            )
        }
        Err(e) => return Err(e.into()),
    };
    info!("webdex listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // In-flight queries have completed; give the pipeline its drain grace.
    handles.shutdown(config.shutdown_timeout()).await;
    info!("webdex stopped");

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).ok();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                if let Some(ref mut s) = sigterm {
                    s.recv().await;
                } else {
                    futures::future::pending::<()>().await;
                }
            } => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown signal received");
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let index = state.index.read().await;
    Json(serde_json::json!({
        "status": "healthy",
        "service": "webdex",
        "version": env!("CARGO_PKG_VERSION"),
        "documents": index.doc_count(),
        "terms": index.term_count(),
    }))
}

/// GET /search?q=word → JSON array of { doc_id, url, title }, best first.
async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, (StatusCode, Json<ErrorResponse>)> {
    let q = params.q.unwrap_or_default();
    let q = q.trim();
    if q.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let index = tokio::time::timeout(QUERY_LOCK_TIMEOUT, state.index.read())
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "index busy: query timed out waiting for the index".to_string(),
                }),
            )
        })?;

    let hits = query::generate_response(q, &index, &state.config);
    Ok(Json(hits))
}

/// GET / → static home page with a search form.
async fn home() -> Html<&'static str> {
    const HOME: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>webdex</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 640px; margin: 2rem auto; padding: 0 1rem; }
    h1 { font-size: 1.5rem; }
    input[type="search"] { width: 100%; padding: 0.5rem; font-size: 1rem; box-sizing: border-box; }
    button { margin-top: 0.5rem; padding: 0.5rem 1rem; font-size: 1rem; cursor: pointer; }
    #results { margin-top: 1.5rem; }
    #results .hit { padding: 0.5rem 0; border-bottom: 1px solid #eee; }
    #results a { color: #06c; }
    .url { font-size: 0.875rem; color: #666; word-break: break-all; }
    .none { color: #666; }
  </style>
</head>
<body>
  <h1>webdex</h1>
  <form id="form">
    <input type="search" name="q" id="q" placeholder="Search the crawl" autofocus>
    <button type="submit">Search</button>
  </form>
  <div id="results"></div>
  <script>
    const form = document.getElementById('form');
    const q = document.getElementById('q');
    const results = document.getElementById('results');
    form.addEventListener('submit', async (e) => {
      e.preventDefault();
      const query = q.value.trim();
      if (!query) { results.innerHTML = ''; return; }
      results.innerHTML = '<p class="none">Searching…</p>';
      try {
        const r = await fetch('/search?q=' + encodeURIComponent(query));
        const hits = await r.json();
        if (!Array.isArray(hits)) {
          results.innerHTML = '<p class="none">Error: ' + (hits.error || 'query failed') + '</p>';
        } else if (hits.length === 0) {
          results.innerHTML = '<p class="none">No results</p>';
        } else {
          results.innerHTML = hits.map(h =>
            '<div class="hit"><a href="' + h.url + '" target="_blank" rel="noopener">' +
            (h.title || h.url) + '</a><div class="url">' + h.url + '</div></div>'
          ).join('');
        }
      } catch (err) {
        results.innerHTML = '<p class="none">Error: ' + err + '</p>';
      }
    });
  </script>
</body>
</html>
"#;
    Html(HOME)
}
