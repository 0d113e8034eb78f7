//! App Core for Smartmarks.
//!
//! Owns the session holder, the sync controller and its mirror, the add form,
//! and the search query, and drives them from auth events and change
//! notifications. Consumers get the state by reference through `App`; there
//! is no ambient global state.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::database::LocalStore;
use crate::managers::bookmark_manager::{BookmarkForm, BookmarkManager, BookmarkManagerTrait, FormStatus};
use crate::managers::bookmark_store::{BookmarkStore, FetchOutcome};
use crate::managers::session_manager::{SessionManager, SessionState};
use crate::managers::sync_controller::{SyncController, SyncOptions};
use crate::providers::auth::AuthProvider;
use crate::providers::notifications::ChangeNotifier;
use crate::providers::persistence::PersistenceProvider;
use crate::services::local_auth::LocalAuthProvider;
use crate::services::search_filter;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::bookmark::Bookmark;
use crate::types::errors::{AuthError, BookmarkError, RemoteError};
use crate::types::identity::{AuthEvent, Identity};
use crate::types::settings::StoreBackend;

/// Something the app reacted to while idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Auth(AuthEvent),
    RemoteChanged,
}

/// Central application struct wiring managers to their collaborators.
pub struct App {
    settings: SettingsEngine,
    auth: Arc<dyn AuthProvider>,
    session: SessionManager,
    sync: SyncController,
    bookmarks: BookmarkManager,
    search_query: String,
}

impl App {
    /// Builds an app from explicit collaborators.
    pub fn new(
        settings: SettingsEngine,
        auth: Arc<dyn AuthProvider>,
        persistence: Arc<dyn PersistenceProvider>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        let store_settings = &settings.get_settings().store;
        let options = SyncOptions {
            collection: store_settings.collection.clone(),
            debounce: Duration::from_millis(settings.get_settings().sync.change_debounce_ms),
        };
        let bookmarks = BookmarkManager::new(persistence.clone(), options.collection.clone());
        let sync = SyncController::new(persistence, notifier, BookmarkStore::new(), options);

        Self {
            session: SessionManager::new(auth.clone()),
            settings,
            auth,
            sync,
            bookmarks,
            search_query: String::new(),
        }
    }

    /// Builds an app from settings: the configured store backend plus the
    /// local identity provider.
    pub fn from_settings(settings: SettingsEngine) -> Result<Self, Box<dyn std::error::Error>> {
        let config = settings.get_settings().clone();
        let account = Identity::new(config.auth.local_user_id.clone(), config.auth.local_email.clone());
        let auth: Arc<dyn AuthProvider> = Arc::new(LocalAuthProvider::new(account));

        let (persistence, notifier): (Arc<dyn PersistenceProvider>, Arc<dyn ChangeNotifier>) =
            match config.store.backend {
                StoreBackend::Local => {
                    let path = settings.database_path();
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    info!("using local store at {}", path.display());
                    let store = Arc::new(LocalStore::open(&path)?);
                    let persistence: Arc<dyn PersistenceProvider> = store.clone();
                    let notifier: Arc<dyn ChangeNotifier> = store;
                    (persistence, notifier)
                }
                StoreBackend::Rest => Self::rest_backend(&config)?,
            };

        Ok(Self::new(settings, auth, persistence, notifier))
    }

    #[cfg(feature = "rest")]
    fn rest_backend(
        config: &crate::types::settings::AppSettings,
    ) -> Result<(Arc<dyn PersistenceProvider>, Arc<dyn ChangeNotifier>), RemoteError> {
        use crate::services::poll_notifier::PollingNotifier;
        use crate::services::rest_store::RestStore;

        let url = config
            .store
            .rest_url
            .as_deref()
            .ok_or_else(|| RemoteError::Unavailable("store.rest_url is not set".to_string()))?;
        let key = config.store.api_key.clone().unwrap_or_default();
        info!("using REST store at {}", url);
        let store: Arc<dyn PersistenceProvider> = Arc::new(RestStore::new(url, key)?);
        let poller: Arc<dyn ChangeNotifier> = Arc::new(PollingNotifier::new(Duration::from_secs(
            config.sync.poll_interval_secs,
        )));
        Ok((store, poller))
    }

    #[cfg(not(feature = "rest"))]
    fn rest_backend(
        _config: &crate::types::settings::AppSettings,
    ) -> Result<(Arc<dyn PersistenceProvider>, Arc<dyn ChangeNotifier>), RemoteError> {
        Err(RemoteError::Unavailable(
            "built without the `rest` feature".to_string(),
        ))
    }

    /// Startup: register for identity changes, probe the session, and start
    /// syncing if someone is already signed in.
    pub async fn start(&mut self) -> SessionState {
        self.session.start().await;
        self.follow_session().await;
        self.session.state().clone()
    }

    /// Waits for the next auth event or change notification. Cancel-safe.
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        tokio::select! {
            event = self.session.next_event() => event.map(AppEvent::Auth),
            changed = self.sync.changed() => changed.then_some(AppEvent::RemoteChanged),
        }
    }

    /// Reacts to one event. Returns `true` if the mirror may have changed.
    pub async fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Auth(event) => {
                if self.session.apply(event) {
                    self.follow_session().await;
                    true
                } else {
                    false
                }
            }
            AppEvent::RemoteChanged => self.sync.on_change().await.is_some(),
        }
    }

    /// Handles everything already queued without waiting. Returns `true` if
    /// the mirror may have changed.
    pub async fn process_pending(&mut self) -> bool {
        let mut touched = false;
        while let Some(event) = self.session.try_next_event() {
            touched |= self.handle_event(AppEvent::Auth(event)).await;
        }
        if self.sync.drain_pending() > 0 {
            touched |= self.sync.refresh().await.is_some();
        }
        touched
    }

    async fn follow_session(&mut self) {
        let identity = self.session.identity().cloned();
        if identity.is_none() {
            self.bookmarks.form_mut().clear();
            self.search_query.clear();
        }
        if let Err(e) = self.sync.set_identity(identity.as_ref()).await {
            warn!("live updates unavailable: {}", e);
        }
    }

    // ─── Auth ───

    pub async fn sign_in(&self) -> Result<(), AuthError> {
        let auth = &self.settings.get_settings().auth;
        self.auth.sign_in(&auth.provider, &auth.redirect_target).await
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.auth.sign_out().await
    }

    pub fn session_state(&self) -> &SessionState {
        self.session.state()
    }

    // ─── Bookmarks ───

    /// Submits the add form. On success the mirror is refetched from the store.
    pub async fn add_bookmark(&mut self) -> Result<(), BookmarkError> {
        let identity = self
            .session
            .identity()
            .cloned()
            .ok_or(BookmarkError::NotAuthenticated)?;
        let mirror = self.sync.store().snapshot();
        self.bookmarks.add_bookmark(&identity, &mirror).await?;
        self.sync.refresh().await;
        Ok(())
    }

    /// Fills the add form and submits it. Signed out, the form is left untouched.
    pub async fn submit(&mut self, title: &str, url: &str) -> Result<(), BookmarkError> {
        if !self.session.state().is_authenticated() {
            return Err(BookmarkError::NotAuthenticated);
        }
        self.bookmarks.form_mut().set(title, url);
        self.add_bookmark().await
    }

    /// Deletes a bookmark owned by the signed-in identity, then refetches.
    pub async fn delete_bookmark(&mut self, id: &str) -> Result<(), BookmarkError> {
        let identity = self
            .session
            .identity()
            .cloned()
            .ok_or(BookmarkError::NotAuthenticated)?;
        if let Err(e) = self.bookmarks.delete_bookmark(&identity, id).await {
            warn!("delete of {} failed: {}", id, e);
            return Err(e);
        }
        self.sync.refresh().await;
        Ok(())
    }

    /// Explicit refetch, e.g. a retry after a failed load.
    pub async fn refresh(&self) -> Option<FetchOutcome> {
        self.sync.refresh().await
    }

    pub fn form(&self) -> &BookmarkForm {
        self.bookmarks.form()
    }

    pub fn form_mut(&mut self) -> &mut BookmarkForm {
        self.bookmarks.form_mut()
    }

    pub fn status(&self) -> Option<&FormStatus> {
        self.bookmarks.form().status.as_ref()
    }

    /// The full mirror, newest first.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.sync.store().snapshot()
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// The mirror filtered by the current search query.
    pub fn visible_bookmarks(&self) -> Vec<Bookmark> {
        let mirror = self.sync.store().snapshot();
        search_filter::filter(&mirror, &self.search_query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.sync.store().is_loading()
    }

    pub fn last_fetch_error(&self) -> Option<RemoteError> {
        self.sync.store().last_error()
    }

    pub fn is_syncing(&self) -> bool {
        self.sync.is_subscribed()
    }

    pub fn settings(&self) -> &SettingsEngine {
        &self.settings
    }

    /// Shutdown: close the change subscription and release the auth listener.
    pub async fn shutdown(&mut self) {
        self.sync.teardown().await;
        self.session.teardown();
    }
}
