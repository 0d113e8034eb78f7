use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::errors::AuthError;
use crate::types::identity::{AuthEvent, Identity};

/// Opaque handle identifying one identity-change listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u64);

/// A registered identity-change listener: release it with
/// [`AuthProvider::remove_listener`] when done.
#[derive(Debug)]
pub struct IdentityListener {
    pub handle: ListenerHandle,
    pub events: mpsc::UnboundedReceiver<AuthEvent>,
}

/// The authentication/session provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// One-shot probe for the currently signed-in identity.
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError>;
    /// Registers a listener for sign-in, sign-out and token-refresh events.
    fn on_identity_change(&self) -> IdentityListener;
    /// Releases a listener. Releasing an unknown handle is a no-op.
    fn remove_listener(&self, handle: ListenerHandle);
    async fn sign_in(&self, provider: &str, redirect_target: &str) -> Result<(), AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
}
