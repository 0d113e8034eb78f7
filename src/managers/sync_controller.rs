//! Keeps the bookmark mirror eventually consistent with the remote store.
//!
//! For the signed-in identity the controller performs one immediate fetch and
//! then holds exactly one change subscription scoped to that identity's rows.
//! Every notification is only a trigger: the controller coalesces whatever is
//! queued and refetches the whole collection. Identity changes and teardown
//! close the subscription before anything else happens.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::managers::bookmark_store::{BookmarkStore, FetchOutcome};
use crate::providers::notifications::{ChangeNotifier, Subscription};
use crate::providers::persistence::{PersistenceProvider, RowFilter};
use crate::types::bookmark::BOOKMARKS_COLLECTION;
use crate::types::errors::RemoteError;
use crate::types::identity::Identity;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub collection: String,
    /// Quiet period after the first notification before refetching.
    pub debounce: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            collection: BOOKMARKS_COLLECTION.to_string(),
            debounce: Duration::from_millis(50),
        }
    }
}

struct ActiveSubscription {
    subscription: Subscription,
    /// The notifier dropped its sender; nothing more will arrive.
    closed: bool,
}

pub struct SyncController {
    persistence: Arc<dyn PersistenceProvider>,
    notifier: Arc<dyn ChangeNotifier>,
    store: BookmarkStore,
    options: SyncOptions,
    identity: Option<Identity>,
    active: Option<ActiveSubscription>,
}

impl SyncController {
    pub fn new(
        persistence: Arc<dyn PersistenceProvider>,
        notifier: Arc<dyn ChangeNotifier>,
        store: BookmarkStore,
        options: SyncOptions,
    ) -> Self {
        Self {
            persistence,
            notifier,
            store,
            options,
            identity: None,
            active: None,
        }
    }

    pub fn store(&self) -> &BookmarkStore {
        &self.store
    }

    pub fn persistence(&self) -> &Arc<dyn PersistenceProvider> {
        &self.persistence
    }

    pub fn collection(&self) -> &str {
        &self.options.collection
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_subscribed(&self) -> bool {
        self.active.is_some()
    }

    /// Follows the session to a new identity, or to none.
    ///
    /// The same identity again (e.g. after a token refresh) is a no-op.
    /// Otherwise the old subscription is closed, the mirror is reset, and for
    /// a signed-in identity one fetch runs before the new subscription opens.
    pub async fn set_identity(&mut self, identity: Option<&Identity>) -> Result<(), RemoteError> {
        if self.identity.as_ref() == identity {
            return Ok(());
        }

        self.close_subscription().await;
        self.identity = identity.cloned();
        self.store.reset(identity);

        let identity = match identity {
            Some(identity) => identity,
            None => {
                info!("sync stopped: no signed-in identity");
                return Ok(());
            }
        };

        self.refresh().await;

        let filter = RowFilter::eq("user_id", identity.id.as_str());
        let subscription = self
            .notifier
            .subscribe(&self.options.collection, &filter)
            .await
            .map_err(|e| {
                warn!("could not subscribe to changes for {}: {}", identity.id, e);
                e
            })?;
        debug!("subscribed {:?} for {}", subscription.handle, identity.id);
        self.active = Some(ActiveSubscription {
            subscription,
            closed: false,
        });
        Ok(())
    }

    /// Refetches the mirror for the current identity. Returns `None`, without
    /// touching the store, when nobody is signed in.
    pub async fn refresh(&self) -> Option<FetchOutcome> {
        let identity = self.identity.as_ref()?;
        Some(
            self.store
                .fetch(self.persistence.as_ref(), &self.options.collection, identity)
                .await,
        )
    }

    /// Waits for the next change notification. Returns `false` once if the
    /// channel closes; pends forever with no live subscription. Cancel-safe.
    pub async fn changed(&mut self) -> bool {
        let active = match self.active.as_mut() {
            Some(active) if !active.closed => active,
            _ => return std::future::pending().await,
        };
        match active.subscription.events.recv().await {
            Some(event) => {
                debug!("change notification: {:?}", event.kind);
                true
            }
            None => {
                warn!("change channel for {:?} closed", active.subscription.handle);
                active.closed = true;
                false
            }
        }
    }

    /// Discards queued notifications, returning how many there were.
    pub fn drain_pending(&mut self) -> usize {
        let mut drained = 0;
        if let Some(active) = self.active.as_mut() {
            while active.subscription.events.try_recv().is_ok() {
                drained += 1;
            }
        }
        drained
    }

    /// Handles a notification received through [`changed`](Self::changed):
    /// waits out the debounce window, folds any further queued triggers into
    /// it, and refetches once.
    pub async fn on_change(&mut self) -> Option<FetchOutcome> {
        if !self.options.debounce.is_zero() {
            tokio::time::sleep(self.options.debounce).await;
        }
        let coalesced = self.drain_pending();
        if coalesced > 0 {
            debug!("coalesced {} extra notification(s)", coalesced);
        }
        self.refresh().await
    }

    /// Closes the subscription and forgets the identity.
    pub async fn teardown(&mut self) {
        self.close_subscription().await;
        self.identity = None;
        self.store.reset(None);
    }

    async fn close_subscription(&mut self) {
        if let Some(active) = self.active.take() {
            let handle = active.subscription.handle;
            if let Err(e) = self.notifier.unsubscribe(handle).await {
                warn!("failed to close subscription {:?}: {}", handle, e);
            } else {
                debug!("closed subscription {:?}", handle);
            }
        }
    }
}
