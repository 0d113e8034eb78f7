//! Unit tests for URL normalisation and validation.

use rstest::rstest;
use smartmarks::services::url_normalizer::{is_valid, normalize};
use smartmarks::types::bookmark::display_url;

#[rstest]
#[case("google.com", "https://google.com/")]
#[case("  google.com  ", "https://google.com/")]
#[case("Example.COM/Path", "https://example.com/Path")]
#[case("https://a.com", "https://a.com/")]
#[case("HTTP://Example.com", "http://example.com/")]
#[case("http://news.example.org/story?id=7#top", "http://news.example.org/story?id=7#top")]
#[case("", "")]
#[case("   ", "")]
fn test_normalize(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(normalize(raw), expected);
}

#[test]
fn test_unparseable_input_keeps_scheme_prefixed_form() {
    assert_eq!(normalize("not a url"), "https://not a url");
}

#[rstest]
#[case("google.com", true)]
#[case("sub.domain.co.uk/path", true)]
#[case("not a url", false)]
#[case("localhost", false)]
#[case("localhost:8080", false)]
#[case("", false)]
fn test_is_valid_after_normalize(#[case] raw: &str, #[case] valid: bool) {
    assert_eq!(is_valid(&normalize(raw)), valid, "input {:?}", raw);
}

#[test]
fn test_is_valid_rejects_relative_values() {
    assert!(!is_valid("google.com"));
    assert!(!is_valid("/just/a/path"));
}

#[rstest]
#[case("https://example.com/", "example.com/")]
#[case("http://example.com/a", "example.com/a")]
#[case("ftp://example.com/", "ftp://example.com/")]
fn test_display_url_strips_http_schemes(#[case] url: &str, #[case] shown: &str) {
    assert_eq!(display_url(url), shown);
}
