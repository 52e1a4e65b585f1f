/// Tokeniser, URL normalisation, and content hashing.
use webdex::text::{content_hash, is_stop_word, normalize_url, tokenize, STOP_WORDS};

#[test]
fn tokenize_lowercases_and_splits_on_non_alphanumerics() {
    assert_eq!(
        tokenize("Hello, World! rust-lang 2024"),
        vec!["hello", "world", "rust", "lang", "2024"]
    );
}

#[test]
fn tokenize_keeps_duplicates_and_order() {
    assert_eq!(tokenize("fox the fox"), vec!["fox", "the", "fox"]);
}

#[test]
fn tokenize_empty_input() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("   \t\n ...!!!").is_empty());
}

#[test]
fn stop_word_set_matches_the_fixed_list() {
    for word in STOP_WORDS {
        assert!(is_stop_word(word), "{word} should be a stop word");
    }
    assert!(!is_stop_word("quick"));
    assert!(!is_stop_word("THE")); // membership is on lowercase tokens
}

#[test]
fn normalize_lowercases_scheme_and_host_and_strips_fragment() {
    assert_eq!(
        normalize_url("HTTP://A.COM/x/#frag").as_deref(),
        Some("http://a.com/x")
    );
}

#[test]
fn normalize_keeps_root_slash() {
    assert_eq!(normalize_url("http://a.com/").as_deref(), Some("http://a.com/"));
}

#[test]
fn normalize_preserves_query_string() {
    assert_eq!(
        normalize_url("https://a.com/search/?q=Rust&page=2#top").as_deref(),
        Some("https://a.com/search?q=Rust&page=2")
    );
}

#[test]
fn normalize_strips_trailing_slash_from_nested_paths() {
    assert_eq!(
        normalize_url("https://en.wikipedia.org/wiki/Rust/").as_deref(),
        Some("https://en.wikipedia.org/wiki/Rust")
    );
}

#[test]
fn normalize_rejects_garbage() {
    assert_eq!(normalize_url("not a url"), None);
    assert_eq!(normalize_url(""), None);
}

#[test]
fn content_hash_is_a_pure_function_of_content() {
    let a = content_hash("alpha beta");
    let b = content_hash("alpha beta");
    let c = content_hash("alpha beta ");
    assert_eq!(a, b);
    assert_ne!(a, c);
    // sha-256 hex
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
}
