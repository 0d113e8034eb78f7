//! Timer-driven change notifier.
//!
//! Used with backends that have no realtime channel: every subscription gets
//! a trigger each `interval`, which the sync controller turns into a refetch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::providers::notifications::{ChangeNotifier, Subscription, SubscriptionHandle};
use crate::providers::persistence::RowFilter;
use crate::types::bookmark::{ChangeEvent, ChangeKind};
use crate::types::errors::RemoteError;

pub struct PollingNotifier {
    interval: Duration,
    tasks: Mutex<HashMap<u64, JoinHandle<()>>>,
    next_handle: AtomicU64,
}

impl PollingNotifier {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            tasks: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    pub fn active_count(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for PollingNotifier {
    fn drop(&mut self) {
        for (_, task) in self.tasks.lock().unwrap_or_else(PoisonError::into_inner).drain() {
            task.abort();
        }
    }
}

#[async_trait]
impl ChangeNotifier for PollingNotifier {
    /// Must be called from within a tokio runtime.
    async fn subscribe(&self, topic: &str, _filter: &RowFilter) -> Result<Subscription, RemoteError> {
        if self.interval.is_zero() {
            return Err(RemoteError::Subscription("poll interval must be positive".to_string()));
        }
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let (sender, events) = mpsc::unbounded_channel();
        let interval = self.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; the caller has just fetched.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if sender.send(ChangeEvent { kind: ChangeKind::Update }).is_err() {
                    break;
                }
            }
        });
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, task);
        debug!("polling {} every {:?} (subscription {})", topic, interval, handle);
        Ok(Subscription {
            handle: SubscriptionHandle(handle),
            events,
        })
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), RemoteError> {
        let task = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle.0);
        match task {
            Some(task) => {
                task.abort();
                Ok(())
            }
            None => Err(RemoteError::Subscription(format!(
                "unknown subscription: {}",
                handle.0
            ))),
        }
    }
}
