//! URL normalisation and validation for submitted bookmarks.
//!
//! Normalisation and validation are separate steps: a value is always
//! normalised (so duplicates are compared on canonical form) even when it is
//! about to be rejected as invalid.

use url::Url;

/// Turns raw user input into a canonical absolute URL.
///
/// - whitespace is trimmed and empty input yields an empty string;
/// - input without an `http://` or `https://` scheme (any case) gets `https://`;
/// - a parseable result is returned in its serialised form, otherwise the
///   scheme-prefixed string is returned unchanged.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let candidate = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    match Url::parse(&candidate) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => candidate,
    }
}

/// Returns `true` when `value` parses as an absolute URL whose host contains a dot.
///
/// Bare hostnames such as `localhost` are rejected.
pub fn is_valid(value: &str) -> bool {
    match Url::parse(value) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| !host.is_empty() && host.contains('.'))
            .unwrap_or(false),
        Err(_) => false,
    }
}

fn has_http_scheme(value: &str) -> bool {
    let lower = value
        .get(..8)
        .map(|prefix| prefix.to_ascii_lowercase())
        .unwrap_or_else(|| value.to_ascii_lowercase());
    lower.starts_with("http://") || lower.starts_with("https://")
}
