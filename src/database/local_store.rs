//! SQLite-backed bookmark backend.
//!
//! Stands in for the managed remote service: it assigns ids and creation
//! times, answers owner-scoped queries, and fans out a change event to every
//! subscription whose filter matches an inserted or deleted row.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use rusqlite::params_from_iter;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::connection::Database;
use crate::providers::notifications::{ChangeNotifier, Subscription, SubscriptionHandle};
use crate::providers::persistence::{OrderBy, PersistenceProvider, RowFilter};
use crate::types::bookmark::{Bookmark, ChangeEvent, ChangeKind, NewBookmarkRow, BOOKMARKS_COLLECTION};
use crate::types::errors::RemoteError;

/// Columns a filter may reference.
const FILTER_COLUMNS: &[&str] = &["id", "user_id", "url", "title"];
/// Columns a query may be ordered by.
const ORDER_COLUMNS: &[&str] = &["created_at", "title", "url"];

const SELECT_COLUMNS: &str = "SELECT id, title, url, user_id, created_at FROM bookmarks";

struct Subscriber {
    topic: String,
    filter: RowFilter,
    sender: mpsc::UnboundedSender<ChangeEvent>,
}

/// Local bookmark store implementing [`PersistenceProvider`] and [`ChangeNotifier`].
pub struct LocalStore {
    db: Mutex<Database>,
    subscribers: Mutex<HashMap<u64, Subscriber>>,
    next_handle: AtomicU64,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Mutex::new(db),
            subscribers: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    fn lock_db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, HashMap<u64, Subscriber>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_collection(collection: &str) -> Result<(), RemoteError> {
        if collection == BOOKMARKS_COLLECTION {
            Ok(())
        } else {
            Err(RemoteError::Query(format!("unknown collection: {}", collection)))
        }
    }

    /// Builds a `WHERE` clause for `filter`. Column names come from a whitelist,
    /// values are always bound.
    fn where_clause(filter: &RowFilter) -> Result<(String, Vec<String>), RemoteError> {
        if filter.terms().is_empty() {
            return Ok((String::new(), Vec::new()));
        }
        let mut clauses = Vec::with_capacity(filter.terms().len());
        let mut values = Vec::with_capacity(filter.terms().len());
        for (i, (column, value)) in filter.terms().iter().enumerate() {
            if !FILTER_COLUMNS.contains(&column.as_str()) {
                return Err(RemoteError::InvalidFilter(column.clone()));
            }
            clauses.push(format!("{} = ?{}", column, i + 1));
            values.push(value.clone());
        }
        Ok((format!(" WHERE {}", clauses.join(" AND ")), values))
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        let created_ms: i64 = row.get(4)?;
        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            owner: row.get(3)?,
            created_at: DateTime::<Utc>::from_timestamp_millis(created_ms).unwrap_or_default(),
        })
    }

    fn select(db: &Database, filter: &RowFilter, order: &str) -> Result<Vec<Bookmark>, RemoteError> {
        let (clause, values) = Self::where_clause(filter)?;
        let sql = format!("{}{}{}", SELECT_COLUMNS, clause, order);
        let mut stmt = db
            .connection()
            .prepare(&sql)
            .map_err(|e| RemoteError::Query(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), Self::row_to_bookmark)
            .map_err(|e| RemoteError::Query(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| RemoteError::Query(e.to_string()))?);
        }
        Ok(results)
    }

    /// Sends `kind` to every subscriber on `topic` whose filter matches `bookmark`.
    /// Subscribers whose receiver is gone are dropped.
    fn publish(&self, topic: &str, kind: ChangeKind, bookmark: &Bookmark) {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|handle, sub| {
            if sub.topic != topic || !sub.filter.matches(|column| column_value(bookmark, column)) {
                return true;
            }
            match sub.sender.send(ChangeEvent { kind }) {
                Ok(()) => true,
                Err(_) => {
                    warn!("dropping subscription {} with closed receiver", handle);
                    false
                }
            }
        });
    }
}

fn column_value<'a>(bookmark: &'a Bookmark, column: &str) -> Option<&'a str> {
    match column {
        "id" => Some(bookmark.id.as_str()),
        "user_id" => Some(bookmark.owner.as_str()),
        "url" => Some(bookmark.url.as_str()),
        "title" => Some(bookmark.title.as_str()),
        _ => None,
    }
}

#[async_trait]
impl PersistenceProvider for LocalStore {
    async fn query(
        &self,
        collection: &str,
        filter: &RowFilter,
        order: &OrderBy,
    ) -> Result<Vec<Bookmark>, RemoteError> {
        Self::check_collection(collection)?;
        if !ORDER_COLUMNS.contains(&order.column.as_str()) {
            return Err(RemoteError::InvalidFilter(order.column.clone()));
        }
        let direction = if order.descending { "DESC" } else { "ASC" };
        let order_sql = format!(" ORDER BY {} {}, seq {}", order.column, direction, direction);
        Self::select(&self.lock_db(), filter, &order_sql)
    }

    async fn insert(&self, collection: &str, row: NewBookmarkRow) -> Result<(), RemoteError> {
        Self::check_collection(collection)?;
        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            title: row.title,
            url: row.url,
            owner: row.user_id,
            created_at: Utc::now(),
        };

        self.lock_db()
            .connection()
            .execute(
                "INSERT INTO bookmarks (id, title, url, user_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    bookmark.id,
                    bookmark.title,
                    bookmark.url,
                    bookmark.owner,
                    bookmark.created_at.timestamp_millis()
                ],
            )
            .map_err(|e| RemoteError::Write(e.to_string()))?;

        debug!("inserted bookmark {} for {}", bookmark.id, bookmark.owner);
        self.publish(collection, ChangeKind::Insert, &bookmark);
        Ok(())
    }

    async fn delete(&self, collection: &str, filter: &RowFilter) -> Result<u64, RemoteError> {
        Self::check_collection(collection)?;
        if filter.terms().is_empty() {
            return Err(RemoteError::InvalidFilter("delete requires a filter".to_string()));
        }

        // One guard across both statements so `doomed` is exactly what was removed.
        let (doomed, affected) = {
            let db = self.lock_db();
            let doomed = Self::select(&db, filter, "")?;
            let (clause, values) = Self::where_clause(filter)?;
            let affected = db
                .connection()
                .execute(
                    &format!("DELETE FROM bookmarks{}", clause),
                    params_from_iter(values.iter()),
                )
                .map_err(|e| RemoteError::Write(e.to_string()))?;
            (doomed, affected)
        };

        for bookmark in &doomed {
            self.publish(collection, ChangeKind::Delete, bookmark);
        }
        debug!("deleted {} bookmark row(s)", affected);
        Ok(affected as u64)
    }
}

#[async_trait]
impl ChangeNotifier for LocalStore {
    async fn subscribe(&self, topic: &str, filter: &RowFilter) -> Result<Subscription, RemoteError> {
        Self::check_collection(topic).map_err(|e| RemoteError::Subscription(e.to_string()))?;
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let (sender, events) = mpsc::unbounded_channel();
        self.lock_subscribers().insert(
            handle,
            Subscriber {
                topic: topic.to_string(),
                filter: filter.clone(),
                sender,
            },
        );
        debug!("opened subscription {} on {}", handle, topic);
        Ok(Subscription {
            handle: SubscriptionHandle(handle),
            events,
        })
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), RemoteError> {
        match self.lock_subscribers().remove(&handle.0) {
            Some(_) => {
                debug!("closed subscription {}", handle.0);
                Ok(())
            }
            None => Err(RemoteError::Subscription(format!(
                "unknown subscription: {}",
                handle.0
            ))),
        }
    }
}
