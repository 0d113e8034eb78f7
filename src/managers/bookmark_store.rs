//! Client-side mirror of one identity's bookmark collection.
//!
//! The mirror is a cache of the remote store and is only ever replaced
//! wholesale by a completed fetch. Fetches are sequenced: each one takes a
//! ticket, and a completion is applied only if no later-issued fetch has
//! already been applied and the owner has not changed in between. Writers
//! never touch the mirror; they request a refetch instead.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use crate::providers::persistence::{OrderBy, PersistenceProvider, RowFilter};
use crate::types::bookmark::Bookmark;
use crate::types::errors::RemoteError;
use crate::types::identity::Identity;

/// Proof that a fetch was issued, carried to its completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The mirror now holds this many bookmarks.
    Applied(usize),
    /// The fetch failed; the mirror was emptied and the error recorded.
    Failed(RemoteError),
    /// A newer fetch or an owner change made this result stale; it was dropped.
    Superseded,
}

#[derive(Debug, Default)]
struct MirrorState {
    owner: Option<String>,
    bookmarks: Vec<Bookmark>,
    issued: u64,
    applied: u64,
    last_error: Option<RemoteError>,
}

/// Shared handle to the mirror. Clones refer to the same collection.
#[derive(Debug, Clone, Default)]
pub struct BookmarkStore {
    inner: Arc<Mutex<MirrorState>>,
}

impl BookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MirrorState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switches the mirror to a new owner (or none), emptying it and
    /// invalidating every outstanding fetch.
    pub fn reset(&self, owner: Option<&Identity>) {
        let mut state = self.lock();
        state.owner = owner.map(|identity| identity.id.clone());
        state.bookmarks.clear();
        state.applied = state.issued;
        state.last_error = None;
    }

    /// Issues a ticket for a fetch on behalf of `identity`.
    pub fn begin_fetch(&self, identity: &Identity) -> FetchTicket {
        let mut state = self.lock();
        state.issued += 1;
        FetchTicket {
            seq: state.issued,
            owner: identity.id.clone(),
        }
    }

    /// Applies a fetch result if it is still the freshest for the current owner.
    ///
    /// Successful results are restricted to the ticket owner's rows and sorted
    /// newest first before replacing the mirror.
    pub fn complete_fetch(
        &self,
        ticket: FetchTicket,
        result: Result<Vec<Bookmark>, RemoteError>,
    ) -> FetchOutcome {
        let mut state = self.lock();
        if state.owner.as_deref() != Some(ticket.owner.as_str()) || ticket.seq <= state.applied {
            debug!(
                "dropping stale fetch #{} (last applied #{})",
                ticket.seq, state.applied
            );
            return FetchOutcome::Superseded;
        }
        state.applied = ticket.seq;

        match result {
            Ok(mut rows) => {
                rows.retain(|bookmark| bookmark.owner == ticket.owner);
                rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                let count = rows.len();
                state.bookmarks = rows;
                state.last_error = None;
                debug!("fetch #{} applied {} bookmark(s)", ticket.seq, count);
                FetchOutcome::Applied(count)
            }
            Err(e) => {
                warn!("fetch #{} failed, mirror emptied: {}", ticket.seq, e);
                state.bookmarks.clear();
                state.last_error = Some(e.clone());
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Fetches `identity`'s bookmarks, newest first, and applies the result.
    pub async fn fetch(
        &self,
        persistence: &dyn PersistenceProvider,
        collection: &str,
        identity: &Identity,
    ) -> FetchOutcome {
        let ticket = self.begin_fetch(identity);
        let filter = RowFilter::eq("user_id", identity.id.as_str());
        let result = persistence
            .query(collection, &filter, &OrderBy::desc("created_at"))
            .await;
        self.complete_fetch(ticket, result)
    }

    /// Copy of the current mirror contents.
    pub fn snapshot(&self) -> Vec<Bookmark> {
        self.lock().bookmarks.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().bookmarks.is_empty()
    }

    pub fn owner(&self) -> Option<String> {
        self.lock().owner.clone()
    }

    /// `true` while the most recently issued fetch has not completed.
    pub fn is_loading(&self) -> bool {
        let state = self.lock();
        state.issued > state.applied
    }

    /// Error from the most recent applied fetch, if it failed.
    pub fn last_error(&self) -> Option<RemoteError> {
        self.lock().last_error.clone()
    }
}
