use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::providers::persistence::RowFilter;
use crate::types::bookmark::ChangeEvent;
use crate::types::errors::RemoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub u64);

/// An open change subscription. `events` yields one trigger per matching
/// insert, update or delete; delivery is at-least-once and unordered with
/// respect to local writes.
#[derive(Debug)]
pub struct Subscription {
    pub handle: SubscriptionHandle,
    pub events: mpsc::UnboundedReceiver<ChangeEvent>,
}

/// The realtime change-notification channel.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn subscribe(&self, topic: &str, filter: &RowFilter) -> Result<Subscription, RemoteError>;
    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), RemoteError>;
}
