//! Duplicate detection against the in-memory mirror.

use crate::services::url_normalizer::normalize;
use crate::types::bookmark::Bookmark;

/// Returns `true` if any bookmark in `collection` has the same canonical URL
/// as `canonical_url`, ignoring case.
///
/// Stored URLs are re-normalised first since older rows may predate the
/// current normalisation rules. Linear scan; personal lists are small.
pub fn exists(collection: &[Bookmark], canonical_url: &str) -> bool {
    let needle = canonical_url.to_lowercase();
    collection
        .iter()
        .any(|bookmark| normalize(&bookmark.url).to_lowercase() == needle)
}
