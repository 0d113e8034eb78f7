//! In-process identity provider.
//!
//! Plays the role of an OAuth-backed session service for the desktop demo,
//! the RPC server, and tests: signing in resolves immediately to the
//! configured account and every transition is broadcast to listeners.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::mpsc;

use crate::providers::auth::{AuthProvider, IdentityListener, ListenerHandle};
use crate::types::errors::AuthError;
use crate::types::identity::{AuthEvent, AuthEventKind, Identity};

/// Sign-in providers accepted by [`LocalAuthProvider`].
pub const SUPPORTED_PROVIDERS: &[&str] = &["google", "github", "local"];

pub struct LocalAuthProvider {
    account: Mutex<Identity>,
    current: Mutex<Option<Identity>>,
    listeners: Mutex<HashMap<u64, mpsc::UnboundedSender<AuthEvent>>>,
    next_handle: AtomicU64,
}

impl LocalAuthProvider {
    /// Creates a provider that starts signed out; `sign_in` resolves to `account`.
    pub fn new(account: Identity) -> Self {
        Self {
            account: Mutex::new(account),
            current: Mutex::new(None),
            listeners: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Creates a provider with a session already established, as after a redirect.
    pub fn signed_in(account: Identity) -> Self {
        let provider = Self::new(account.clone());
        *provider.lock_current() = Some(account);
        provider
    }

    /// Signs in as a different account, as if another user completed the flow.
    pub fn switch_account(&self, account: Identity) {
        *lock(&self.account) = account.clone();
        *self.lock_current() = Some(account.clone());
        self.broadcast(AuthEvent {
            kind: AuthEventKind::SignedIn,
            identity: Some(account),
        });
    }

    /// Emits a token refresh for the current session, if any.
    pub fn refresh_token(&self) {
        let current = self.lock_current().clone();
        if current.is_some() {
            self.broadcast(AuthEvent {
                kind: AuthEventKind::TokenRefreshed,
                identity: current,
            });
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<Identity>> {
        lock(&self.current)
    }

    fn broadcast(&self, event: AuthEvent) {
        debug!("auth event {:?}", event.kind);
        lock(&self.listeners).retain(|_, sender| sender.send(event.clone()).is_ok());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        Ok(self.lock_current().clone())
    }

    fn on_identity_change(&self) -> IdentityListener {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let (sender, events) = mpsc::unbounded_channel();
        lock(&self.listeners).insert(handle, sender);
        IdentityListener {
            handle: ListenerHandle(handle),
            events,
        }
    }

    fn remove_listener(&self, handle: ListenerHandle) {
        lock(&self.listeners).remove(&handle.0);
    }

    async fn sign_in(&self, provider: &str, redirect_target: &str) -> Result<(), AuthError> {
        if !SUPPORTED_PROVIDERS.contains(&provider) {
            return Err(AuthError::UnsupportedProvider(provider.to_string()));
        }
        let account = lock(&self.account).clone();
        info!(
            "signed in {} via {} (redirect to {})",
            account.email, provider, redirect_target
        );
        *self.lock_current() = Some(account.clone());
        self.broadcast(AuthEvent {
            kind: AuthEventKind::SignedIn,
            identity: Some(account),
        });
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.lock_current().take();
        if let Some(identity) = previous {
            info!("signed out {}", identity.email);
        }
        self.broadcast(AuthEvent {
            kind: AuthEventKind::SignedOut,
            identity: None,
        });
        Ok(())
    }
}
