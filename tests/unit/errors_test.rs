//! Unit tests for the error types: classification, user-facing messages,
//! and the `Display`/`source` chain.

use std::error::Error;

use rstest::rstest;
use smartmarks::types::errors::{AuthError, BookmarkError, ErrorKind, RemoteError, SettingsError};

#[rstest]
#[case(BookmarkError::MissingField, ErrorKind::Validation)]
#[case(BookmarkError::MalformedUrl("https://x".into()), ErrorKind::Validation)]
#[case(BookmarkError::Duplicate("https://x.com/".into()), ErrorKind::Conflict)]
#[case(BookmarkError::Remote(RemoteError::Write("down".into())), ErrorKind::Remote)]
#[case(BookmarkError::NotAuthenticated, ErrorKind::Auth)]
fn test_bookmark_error_kind(#[case] err: BookmarkError, #[case] kind: ErrorKind) {
    assert_eq!(err.kind(), kind);
}

#[rstest]
#[case(BookmarkError::MissingField, "Please fill all fields")]
#[case(
    BookmarkError::MalformedUrl("https://x".into()),
    "Please enter a valid URL (example: google.com)"
)]
#[case(BookmarkError::Duplicate("https://x.com/".into()), "This bookmark already exists")]
#[case(
    BookmarkError::Remote(RemoteError::Write("down".into())),
    "Failed to add bookmark. Please try again."
)]
fn test_user_messages(#[case] err: BookmarkError, #[case] expected: &str) {
    assert_eq!(err.user_message(), expected);
}

#[test]
fn test_remote_error_converts_and_chains() {
    let err: BookmarkError = RemoteError::Query("timeout".into()).into();
    assert_eq!(err, BookmarkError::Remote(RemoteError::Query("timeout".into())));
    assert_eq!(err.to_string(), "Bookmark remote error: Remote query failed: timeout");

    let source = err.source().expect("remote errors carry a source");
    assert_eq!(source.to_string(), "Remote query failed: timeout");
    assert!(BookmarkError::MissingField.source().is_none());
}

#[test]
fn test_display_messages() {
    assert_eq!(
        BookmarkError::Duplicate("https://a.com/".into()).to_string(),
        "Duplicate bookmark URL: https://a.com/"
    );
    assert_eq!(
        RemoteError::Unavailable("no url".into()).to_string(),
        "Remote store unavailable: no url"
    );
    assert_eq!(
        AuthError::Provider("boom".into()).to_string(),
        "Auth provider error: boom"
    );
    assert_eq!(
        AuthError::UnsupportedProvider("myspace".into()).to_string(),
        "Unsupported sign-in provider: myspace"
    );
    assert!(SettingsError::InvalidKey("x.y".into()).to_string().contains("x.y"));
}
