/// HTML extraction: title, headings, content stripping, link filtering.
use webdex::crawler::parse::{build_page_record, extract_content, extract_headings, extract_title};
use webdex::crawler::fetch::{FetchError, FetchedPage};
use webdex::text::content_hash;
use webdex::EngineConfig;

fn page(body: &str) -> FetchedPage {
    FetchedPage {
        url: "https://en.wikipedia.org/wiki/Main_Page".to_string(),
        final_url: "https://en.wikipedia.org/wiki/Main_Page".to_string(),
        status: 200,
        content_type: "text/html; charset=utf-8".to_string(),
        body: body.to_string(),
    }
}

#[test]
fn extracts_title_headings_and_collapsed_content() {
    let html = r#"
        <html>
          <head><title>  Hello World  </title></head>
          <body>
            <h1>First</h1>
            <p>the   quick
               brown fox</p>
            <h3>Second</h3>
            <h2></h2>
          </body>
        </html>"#;
    let doc = scraper::Html::parse_document(html);

    assert_eq!(extract_title(&doc), "Hello World");
    assert_eq!(extract_headings(&doc), vec!["First", "Second"]);
    assert_eq!(extract_content(&doc), "First the quick brown fox Second");
}

#[test]
fn content_excludes_chrome_subtrees_and_head() {
    let html = r#"
        <html>
          <head><title>Ignored</title><style>body { color: red }</style></head>
          <body>
            <nav>skip nav</nav>
            <header>skip header</header>
            <script>var skip = 1;</script>
            <p>keep this</p>
            <footer>skip footer</footer>
          </body>
        </html>"#;
    let doc = scraper::Html::parse_document(html);
    assert_eq!(extract_content(&doc), "keep this");
}

#[test]
fn record_links_are_resolved_filtered_and_ordered() {
    let cfg = EngineConfig::default();
    let html = r#"
        <body>
          <a href="/wiki/Rust">relative, resolves to accepted domain</a>
          <a href="https://en.wikipedia.org/wiki/Crab">absolute accepted</a>
          <a href="http://en.wikipedia.org/wiki/Insecure">not https</a>
          <a href="https://example.com/other">unaccepted domain</a>
          <a href="https://en.wikipedia.org/static/logo.PNG">blocked extension</a>
        </body>"#;
    let record = build_page_record(&page(html), &cfg).unwrap();

    assert_eq!(
        record.links,
        vec![
            "https://en.wikipedia.org/wiki/Rust".to_string(),
            "https://en.wikipedia.org/wiki/Crab".to_string(),
        ]
    );
}

#[test]
fn record_doc_id_is_the_content_hash() {
    let cfg = EngineConfig::default();
    let record = build_page_record(&page("<body>alpha beta</body>"), &cfg).unwrap();
    assert_eq!(record.doc_id, content_hash("alpha beta"));
    assert_eq!(record.content, "alpha beta");
    assert_eq!(record.http_status, 200);
}

#[test]
fn identical_bodies_on_distinct_urls_share_a_doc_id() {
    let cfg = EngineConfig::default();
    let mut a = page("<body>alpha beta</body>");
    let mut b = page("<body>alpha beta</body>");
    a.url = "https://en.wikipedia.org/wiki/A".to_string();
    b.url = "https://en.wikipedia.org/wiki/B".to_string();
    let ra = build_page_record(&a, &cfg).unwrap();
    let rb = build_page_record(&b, &cfg).unwrap();
    assert_eq!(ra.doc_id, rb.doc_id);
}

#[test]
fn non_200_status_is_skipped() {
    let cfg = EngineConfig::default();
    let mut p = page("<body>gone</body>");
    p.status = 404;
    assert!(matches!(
        build_page_record(&p, &cfg),
        Err(FetchError::BadStatus(404))
    ));
}

#[test]
fn non_html_content_type_is_skipped() {
    let cfg = EngineConfig::default();
    let mut p = page("{}");
    p.content_type = "application/json".to_string();
    assert!(matches!(
        build_page_record(&p, &cfg),
        Err(FetchError::UnsupportedContentType(_))
    ));
}

#[test]
fn xml_content_type_is_accepted() {
    let cfg = EngineConfig::default();
    let mut p = page("<html><body>feed text</body></html>");
    p.content_type = "application/xhtml+xml".to_string();
    let record = build_page_record(&p, &cfg).unwrap();
    assert_eq!(record.content, "feed text");
}
