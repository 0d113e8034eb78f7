//! Session state holder.
//!
//! Tracks who is signed in. The state starts `Unknown`, is settled by a
//! one-shot probe at startup, and then follows identity-change events from
//! the auth provider until the listener is released on teardown.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc::error::TryRecvError;

use crate::providers::auth::{AuthProvider, IdentityListener};
use crate::types::identity::{AuthEvent, Identity};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The startup probe has not resolved yet.
    #[default]
    Unknown,
    Authenticated(Identity),
    Anonymous,
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

pub struct SessionManager {
    auth: Arc<dyn AuthProvider>,
    state: SessionState,
    listener: Option<IdentityListener>,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            auth,
            state: SessionState::Unknown,
            listener: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.state.identity()
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Registers for identity changes, then probes the current identity.
    ///
    /// The listener goes first so no transition between the two is lost.
    pub async fn start(&mut self) -> &SessionState {
        self.listen();
        self.probe().await;
        &self.state
    }

    /// Registers the identity-change listener if not already registered.
    pub fn listen(&mut self) {
        if self.listener.is_none() {
            self.listener = Some(self.auth.on_identity_change());
        }
    }

    /// Resolves the initial identity. Only applies while the state is still
    /// `Unknown`, so an event that arrived first is never overwritten.
    pub async fn probe(&mut self) {
        let probed = match self.auth.current_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!("identity probe failed, treating session as anonymous: {}", e);
                None
            }
        };
        if self.state == SessionState::Unknown {
            self.state = state_for(probed);
            debug!("session probe resolved: authenticated={}", self.state.is_authenticated());
        }
    }

    /// Applies an auth event. Returns `true` when the signed-in identity
    /// changed; a token refresh for the same user returns `false`.
    pub fn apply(&mut self, event: AuthEvent) -> bool {
        let next = state_for(event.identity);
        let changed = next.identity() != self.state.identity()
            || self.state == SessionState::Unknown;
        if changed {
            info!(
                "session {:?}: {}",
                event.kind,
                next.identity().map(|i| i.email.as_str()).unwrap_or("anonymous")
            );
        }
        self.state = next;
        changed
    }

    /// Waits for the next identity-change event.
    ///
    /// Pends forever when no listener is registered. Cancel-safe.
    pub async fn next_event(&mut self) -> Option<AuthEvent> {
        let listener = match self.listener.as_mut() {
            Some(listener) => listener,
            None => return std::future::pending().await,
        };
        match listener.events.recv().await {
            Some(event) => Some(event),
            None => {
                warn!("auth provider closed the identity-change channel");
                self.listener = None;
                None
            }
        }
    }

    /// Returns an already-queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<AuthEvent> {
        let listener = self.listener.as_mut()?;
        match listener.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.listener = None;
                None
            }
        }
    }

    /// Releases the identity-change listener.
    pub fn teardown(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.auth.remove_listener(listener.handle);
            debug!("released identity listener {:?}", listener.handle);
        }
    }
}

fn state_for(identity: Option<Identity>) -> SessionState {
    match identity {
        Some(identity) => SessionState::Authenticated(identity),
        None => SessionState::Anonymous,
    }
}
