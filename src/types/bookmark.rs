use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the remote collection holding bookmark rows.
pub const BOOKMARKS_COLLECTION: &str = "bookmarks";

/// A saved bookmark as read back from the store.
///
/// Bookmarks are never edited in place: they are created by an add and
/// destroyed by a delete. `owner` is only used to scope writes and is not
/// serialised towards clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "user_id", skip_serializing)]
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// The row shape written on insert. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookmarkRow {
    pub title: String,
    pub url: String,
    pub user_id: String,
}

/// Kind of change reported by the notification channel.
///
/// Consumers treat every kind the same way: as a signal to refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
}

/// Strips a leading `http://` or `https://` for list rendering.
pub fn display_url(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}
