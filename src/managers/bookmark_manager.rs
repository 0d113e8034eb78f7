//! Bookmark Manager: add and delete against the remote store.
//!
//! Adds pass through ordered gates (required fields, URL validity,
//! duplicate check) and only then write. Neither operation edits the mirror;
//! the caller refetches after a successful write.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use crate::providers::persistence::{PersistenceProvider, RowFilter};
use crate::services::{dedup, url_normalizer};
use crate::types::bookmark::{Bookmark, NewBookmarkRow};
use crate::types::errors::BookmarkError;
use crate::types::identity::Identity;

pub const ADDED_MESSAGE: &str = "Bookmark added!";

/// Inline status shown under the add form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Success(String),
    Error(String),
}

impl FormStatus {
    pub fn message(&self) -> &str {
        match self {
            FormStatus::Success(msg) | FormStatus::Error(msg) => msg,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FormStatus::Success(_))
    }
}

/// The add form's input fields and last outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkForm {
    pub title: String,
    pub url: String,
    pub status: Option<FormStatus>,
}

impl BookmarkForm {
    pub fn set(&mut self, title: impl Into<String>, url: impl Into<String>) {
        self.title = title.into();
        self.url = url.into();
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.url.clear();
        self.status = None;
    }
}

/// Checks a submission against the add gates without any I/O.
///
/// Returns the trimmed title and canonical URL on success.
pub fn validate_submission(
    raw_title: &str,
    raw_url: &str,
    mirror: &[Bookmark],
) -> Result<(String, String), BookmarkError> {
    let title = raw_title.trim();
    let url = raw_url.trim();
    if title.is_empty() || url.is_empty() {
        return Err(BookmarkError::MissingField);
    }

    let canonical = url_normalizer::normalize(url);
    if !url_normalizer::is_valid(&canonical) {
        return Err(BookmarkError::MalformedUrl(canonical));
    }

    if dedup::exists(mirror, &canonical) {
        return Err(BookmarkError::Duplicate(canonical));
    }

    Ok((title.to_string(), canonical))
}

/// Trait defining bookmark mutation operations.
#[async_trait]
pub trait BookmarkManagerTrait {
    /// Submits the form for `identity`, checking duplicates against `mirror`.
    async fn add_bookmark(
        &mut self,
        identity: &Identity,
        mirror: &[Bookmark],
    ) -> Result<NewBookmarkRow, BookmarkError>;
    /// Deletes bookmark `id`, scoped to `identity`.
    async fn delete_bookmark(&self, identity: &Identity, id: &str) -> Result<(), BookmarkError>;
}

pub struct BookmarkManager {
    persistence: Arc<dyn PersistenceProvider>,
    collection: String,
    form: BookmarkForm,
}

impl BookmarkManager {
    pub fn new(persistence: Arc<dyn PersistenceProvider>, collection: impl Into<String>) -> Self {
        Self {
            persistence,
            collection: collection.into(),
            form: BookmarkForm::default(),
        }
    }

    pub fn form(&self) -> &BookmarkForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut BookmarkForm {
        &mut self.form
    }
}

#[async_trait]
impl BookmarkManagerTrait for BookmarkManager {
    /// On success the input fields are cleared and a success status is set;
    /// on failure the fields are kept and the status carries the reason.
    async fn add_bookmark(
        &mut self,
        identity: &Identity,
        mirror: &[Bookmark],
    ) -> Result<NewBookmarkRow, BookmarkError> {
        self.form.status = None;

        let (title, url) = match validate_submission(&self.form.title, &self.form.url, mirror) {
            Ok(valid) => valid,
            Err(e) => {
                debug!("add rejected: {}", e);
                self.form.status = Some(FormStatus::Error(e.user_message().to_string()));
                return Err(e);
            }
        };

        let row = NewBookmarkRow {
            title,
            url,
            user_id: identity.id.clone(),
        };
        if let Err(e) = self.persistence.insert(&self.collection, row.clone()).await {
            let err = BookmarkError::from(e);
            self.form.status = Some(FormStatus::Error(err.user_message().to_string()));
            return Err(err);
        }

        info!("added bookmark {} for {}", row.url, identity.id);
        self.form.title.clear();
        self.form.url.clear();
        self.form.status = Some(FormStatus::Success(ADDED_MESSAGE.to_string()));
        Ok(row)
    }

    async fn delete_bookmark(&self, identity: &Identity, id: &str) -> Result<(), BookmarkError> {
        let filter = RowFilter::eq("id", id).and_eq("user_id", identity.id.as_str());
        let removed = self.persistence.delete(&self.collection, &filter).await?;
        if removed == 0 {
            debug!("delete of {} for {} matched no rows", id, identity.id);
        }
        Ok(())
    }
}
