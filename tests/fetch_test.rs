/// HttpFetcher against a local mock server: header behaviour, redirect
/// following, and non-2xx tolerance.
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use webdex::crawler::fetch::PageFetcher;
use webdex::{EngineConfig, HttpFetcher};

#[tokio::test]
async fn sends_the_browser_like_user_agent() {
    let cfg = EngineConfig::default();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", cfg.user_agent.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body>ok</body></html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&cfg).unwrap();
    let page = fetcher.fetch(&format!("{}/ua", server.uri())).await.unwrap();
    assert_eq!(page.status, 200);
    assert!(page.content_type.contains("text/html"));
}

#[tokio::test]
async fn follows_redirects_and_reports_the_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body>moved here</body></html>"),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&EngineConfig::default()).unwrap();
    let requested = format!("{}/old", server.uri());
    let page = fetcher.fetch(&requested).await.unwrap();

    assert_eq!(page.url, requested);
    assert_eq!(page.final_url, format!("{}/new", server.uri()));
    assert_eq!(page.status, 200);
    assert!(page.body.contains("moved here"));
}

#[tokio::test]
async fn non_2xx_responses_are_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&EngineConfig::default()).unwrap();
    let page = fetcher
        .fetch(&format!("{}/gone", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.status, 503);
}
