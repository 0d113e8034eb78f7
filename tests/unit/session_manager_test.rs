//! Unit tests for the session state holder.

#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use smartmarks::managers::session_manager::{SessionManager, SessionState};
use smartmarks::providers::auth::{AuthProvider, IdentityListener, ListenerHandle};
use smartmarks::services::local_auth::LocalAuthProvider;
use smartmarks::types::errors::AuthError;
use smartmarks::types::identity::{AuthEvent, AuthEventKind, Identity};

use support::{alice, bob};

/// Auth provider whose probe always fails.
struct BrokenAuth;

#[async_trait]
impl AuthProvider for BrokenAuth {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        Err(AuthError::Provider("network unreachable".into()))
    }

    fn on_identity_change(&self) -> IdentityListener {
        let (_sender, events) = mpsc::unbounded_channel();
        IdentityListener {
            handle: ListenerHandle(1),
            events,
        }
    }

    fn remove_listener(&self, _handle: ListenerHandle) {}

    async fn sign_in(&self, _provider: &str, _redirect_target: &str) -> Result<(), AuthError> {
        Err(AuthError::Provider("network unreachable".into()))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

fn signed_in(identity: Identity) -> AuthEvent {
    AuthEvent {
        kind: AuthEventKind::SignedIn,
        identity: Some(identity),
    }
}

#[tokio::test]
async fn test_state_is_unknown_until_probe_resolves() {
    let auth = Arc::new(LocalAuthProvider::new(alice()));
    let mut session = SessionManager::new(auth.clone());
    assert_eq!(session.state(), &SessionState::Unknown);

    assert_eq!(session.start().await, &SessionState::Anonymous);
    assert!(session.is_listening());
    assert_eq!(auth.listener_count(), 1);
}

#[tokio::test]
async fn test_probe_picks_up_existing_session() {
    let auth = Arc::new(LocalAuthProvider::signed_in(alice()));
    let mut session = SessionManager::new(auth);

    session.start().await;
    assert_eq!(session.identity(), Some(&alice()));
}

#[tokio::test]
async fn test_probe_failure_is_anonymous() {
    let mut session = SessionManager::new(Arc::new(BrokenAuth));
    assert_eq!(session.start().await, &SessionState::Anonymous);
}

#[tokio::test]
async fn test_late_probe_never_overwrites_an_earlier_event() {
    // The provider still reports nobody, but a sign-in event got here first.
    let auth = Arc::new(LocalAuthProvider::new(alice()));
    let mut session = SessionManager::new(auth);
    session.listen();

    assert!(session.apply(signed_in(bob())));
    session.probe().await;

    assert_eq!(session.identity(), Some(&bob()));
}

#[tokio::test]
async fn test_apply_reports_only_identity_changes() {
    let auth = Arc::new(LocalAuthProvider::new(alice()));
    let mut session = SessionManager::new(auth);
    session.start().await;

    assert!(session.apply(signed_in(alice())));
    assert!(!session.apply(AuthEvent {
        kind: AuthEventKind::TokenRefreshed,
        identity: Some(alice()),
    }));
    assert!(session.apply(signed_in(bob())));
    assert!(session.apply(AuthEvent {
        kind: AuthEventKind::SignedOut,
        identity: None,
    }));
    assert_eq!(session.state(), &SessionState::Anonymous);
    assert!(!session.apply(AuthEvent {
        kind: AuthEventKind::SignedOut,
        identity: None,
    }));
}

#[tokio::test]
async fn test_provider_events_reach_the_listener() {
    let auth = Arc::new(LocalAuthProvider::new(alice()));
    let mut session = SessionManager::new(auth.clone());
    session.start().await;

    auth.sign_in("google", "http://localhost:3000").await.unwrap();
    let event = tokio::time::timeout(Duration::from_secs(1), session.next_event())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.kind, AuthEventKind::SignedIn);
    assert!(session.apply(event));
    assert!(session.state().is_authenticated());

    auth.refresh_token();
    let event = session.try_next_event().unwrap();
    assert_eq!(event.kind, AuthEventKind::TokenRefreshed);
    assert!(!session.apply(event));
    assert!(session.try_next_event().is_none());
}

#[tokio::test]
async fn test_teardown_releases_the_listener() {
    let auth = Arc::new(LocalAuthProvider::new(alice()));
    let mut session = SessionManager::new(auth.clone());
    session.start().await;

    session.teardown();
    assert!(!session.is_listening());
    assert_eq!(auth.listener_count(), 0);

    auth.sign_in("google", "http://localhost:3000").await.unwrap();
    assert!(session.try_next_event().is_none());
}

#[tokio::test]
async fn test_closed_channel_stops_listening() {
    let mut session = SessionManager::new(Arc::new(BrokenAuth));
    session.start().await;

    // BrokenAuth dropped its sender right away.
    assert!(session.next_event().await.is_none());
    assert!(!session.is_listening());
}
