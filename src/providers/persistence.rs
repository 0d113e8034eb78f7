use async_trait::async_trait;

use crate::types::bookmark::{Bookmark, NewBookmarkRow};
use crate::types::errors::RemoteError;

/// A conjunction of column-equality terms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowFilter {
    terms: Vec<(String, String)>,
}

impl RowFilter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            terms: vec![(column.into(), value.into())],
        }
    }

    pub fn and_eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.terms.push((column.into(), value.into()));
        self
    }

    pub fn terms(&self) -> &[(String, String)] {
        &self.terms
    }

    /// Value required for `column`, if the filter constrains it.
    pub fn value_of(&self, column: &str) -> Option<&str> {
        self.terms
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Evaluates the filter against a column lookup.
    pub fn matches<'a, F>(&self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        self.terms
            .iter()
            .all(|(column, value)| lookup(column) == Some(value.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }
}

/// The remote persistence/query service.
#[async_trait]
pub trait PersistenceProvider: Send + Sync {
    async fn query(
        &self,
        collection: &str,
        filter: &RowFilter,
        order: &OrderBy,
    ) -> Result<Vec<Bookmark>, RemoteError>;
    async fn insert(&self, collection: &str, row: NewBookmarkRow) -> Result<(), RemoteError>;
    /// Deletes every row matching `filter`, returning how many were removed.
    async fn delete(&self, collection: &str, filter: &RowFilter) -> Result<u64, RemoteError>;
}
