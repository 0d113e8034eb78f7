//! Derived, read-only search view over the mirror.

use crate::types::bookmark::Bookmark;

/// Returns the bookmarks whose title contains `query`, case-insensitively,
/// in the collection's own order. An empty query matches everything.
///
/// URLs are not searched.
pub fn filter<'a>(collection: &'a [Bookmark], query: &str) -> Vec<&'a Bookmark> {
    let needle = query.to_lowercase();
    collection
        .iter()
        .filter(|bookmark| bookmark.title.to_lowercase().contains(&needle))
        .collect()
}
