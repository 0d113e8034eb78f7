//! Unit tests for the sync controller: subscription lifecycle, refetch on
//! notification, and race handling across identity changes.

#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;
use std::time::Duration;

use smartmarks::managers::bookmark_store::{BookmarkStore, FetchOutcome};
use smartmarks::managers::sync_controller::{SyncController, SyncOptions};
use smartmarks::providers::persistence::PersistenceProvider;
use smartmarks::types::bookmark::{ChangeKind, NewBookmarkRow, BOOKMARKS_COLLECTION};

use support::{alice, bob, bookmark, ScriptedStore};

fn seeded() -> Arc<ScriptedStore> {
    Arc::new(ScriptedStore::with_rows(vec![
        bookmark("a1", &alice(), "Rust", "https://rust-lang.org/", 1),
        bookmark("a2", &alice(), "Docs", "https://docs.rs/", 2),
        bookmark("b1", &bob(), "News", "https://news.ycombinator.com/", 3),
    ]))
}

fn controller(remote: &Arc<ScriptedStore>) -> SyncController {
    SyncController::new(
        remote.clone(),
        remote.clone(),
        BookmarkStore::new(),
        SyncOptions {
            collection: BOOKMARKS_COLLECTION.to_string(),
            debounce: Duration::from_millis(5),
        },
    )
}

fn ids(sync: &SyncController) -> Vec<String> {
    sync.store().snapshot().into_iter().map(|b| b.id).collect()
}

#[tokio::test]
async fn test_sign_in_fetches_once_then_subscribes_once() {
    let remote = seeded();
    let mut sync = controller(&remote);

    sync.set_identity(Some(&alice())).await.unwrap();

    assert_eq!(ids(&sync), vec!["a2", "a1"]);
    assert_eq!(ScriptedStore::count(&remote.queries), 1);
    assert_eq!(ScriptedStore::count(&remote.subscribes), 1);
    assert_eq!(remote.open_subscriptions(), 1);
    assert!(sync.is_subscribed());
}

#[tokio::test]
async fn test_same_identity_again_is_a_no_op() {
    let remote = seeded();
    let mut sync = controller(&remote);
    sync.set_identity(Some(&alice())).await.unwrap();

    sync.set_identity(Some(&alice())).await.unwrap();

    assert_eq!(ScriptedStore::count(&remote.queries), 1);
    assert_eq!(ScriptedStore::count(&remote.subscribes), 1);
    assert_eq!(ScriptedStore::count(&remote.unsubscribes), 0);
}

#[tokio::test]
async fn test_switching_identity_replaces_subscription_and_mirror() {
    let remote = seeded();
    let mut sync = controller(&remote);
    sync.set_identity(Some(&alice())).await.unwrap();

    sync.set_identity(Some(&bob())).await.unwrap();

    assert_eq!(ids(&sync), vec!["b1"]);
    assert_eq!(ScriptedStore::count(&remote.unsubscribes), 1);
    assert_eq!(ScriptedStore::count(&remote.subscribes), 2);
    assert_eq!(remote.open_subscriptions(), 1);
    assert_eq!(sync.store().owner().as_deref(), Some("user-bob"));
}

#[tokio::test]
async fn test_going_anonymous_closes_subscription_exactly_once() {
    let remote = seeded();
    let mut sync = controller(&remote);
    sync.set_identity(Some(&alice())).await.unwrap();

    sync.set_identity(None).await.unwrap();
    sync.set_identity(None).await.unwrap();

    assert_eq!(ScriptedStore::count(&remote.unsubscribes), 1);
    assert_eq!(remote.open_subscriptions(), 0);
    assert!(!sync.is_subscribed());
    assert!(sync.store().is_empty());

    assert_eq!(sync.refresh().await, None);
    assert_eq!(ScriptedStore::count(&remote.queries), 1);
}

#[tokio::test]
async fn test_notifications_are_coalesced_into_one_refetch() {
    let remote = seeded();
    let mut sync = controller(&remote);
    sync.set_identity(Some(&alice())).await.unwrap();

    remote.push_row(bookmark("a3", &alice(), "Crates", "https://crates.io/", 4));
    remote.notify_all(ChangeKind::Insert);
    remote.notify_all(ChangeKind::Update);
    remote.notify_all(ChangeKind::Delete);

    let changed = tokio::time::timeout(Duration::from_secs(1), sync.changed()).await;
    assert_eq!(changed, Ok(true));
    assert_eq!(sync.on_change().await, Some(FetchOutcome::Applied(3)));

    assert_eq!(ids(&sync), vec!["a3", "a2", "a1"]);
    assert_eq!(ScriptedStore::count(&remote.queries), 2);
    assert_eq!(sync.drain_pending(), 0);
}

#[tokio::test]
async fn test_remote_writes_for_own_rows_trigger_notifications() {
    let remote = seeded();
    let mut sync = controller(&remote);
    sync.set_identity(Some(&alice())).await.unwrap();

    // Someone else's write is outside the subscription's filter.
    remote
        .insert(
            BOOKMARKS_COLLECTION,
            NewBookmarkRow {
                title: "Other".into(),
                url: "https://other.com/".into(),
                user_id: bob().id,
            },
        )
        .await
        .unwrap();
    assert_eq!(sync.drain_pending(), 0);

    remote
        .insert(
            BOOKMARKS_COLLECTION,
            NewBookmarkRow {
                title: "Mine".into(),
                url: "https://mine.com/".into(),
                user_id: alice().id,
            },
        )
        .await
        .unwrap();
    assert!(sync.changed().await);
    sync.on_change().await;
    assert_eq!(sync.store().len(), 3);
}

#[tokio::test]
async fn test_no_subscription_means_changed_never_resolves() {
    let remote = seeded();
    let mut sync = controller(&remote);

    let waited = tokio::time::timeout(Duration::from_millis(30), sync.changed()).await;
    assert!(waited.is_err());
}

#[tokio::test]
async fn test_closed_channel_reports_once_then_pends() {
    let remote = seeded();
    let mut sync = controller(&remote);
    sync.set_identity(Some(&alice())).await.unwrap();

    remote.close_channels();
    assert!(!sync.changed().await);
    let waited = tokio::time::timeout(Duration::from_millis(30), sync.changed()).await;
    assert!(waited.is_err());
}

#[tokio::test]
async fn test_subscribe_failure_keeps_the_fetched_mirror() {
    let remote = seeded();
    ScriptedStore::set(&remote.fail_subscribe, true);
    let mut sync = controller(&remote);

    assert!(sync.set_identity(Some(&alice())).await.is_err());
    assert_eq!(sync.store().len(), 2);
    assert!(!sync.is_subscribed());
    assert_eq!(sync.identity(), Some(&alice()));
}

#[tokio::test]
async fn test_fetch_failure_empties_the_mirror() {
    let remote = seeded();
    let mut sync = controller(&remote);
    sync.set_identity(Some(&alice())).await.unwrap();

    ScriptedStore::set(&remote.fail_queries, true);
    let outcome = sync.refresh().await;
    assert!(matches!(outcome, Some(FetchOutcome::Failed(_))));
    assert!(sync.store().is_empty());
    assert!(sync.store().last_error().is_some());

    ScriptedStore::set(&remote.fail_queries, false);
    assert_eq!(sync.refresh().await, Some(FetchOutcome::Applied(2)));
}

#[tokio::test]
async fn test_slow_fetch_for_previous_identity_is_discarded() {
    let remote = seeded();
    let mut sync = controller(&remote);
    sync.set_identity(Some(&alice())).await.unwrap();

    let mirror = sync.store().clone();
    let persistence = remote.clone();
    remote.delay_queries(&[Duration::from_millis(80)]);

    let stale = async { mirror.fetch(persistence.as_ref(), BOOKMARKS_COLLECTION, &alice()).await };
    let switch = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        sync.set_identity(Some(&bob())).await
    };
    let (stale, switched) = tokio::join!(stale, switch);

    assert!(switched.is_ok());
    assert_eq!(stale, FetchOutcome::Superseded);
    assert_eq!(ids(&sync), vec!["b1"]);
}

#[tokio::test]
async fn test_teardown_unsubscribes_and_forgets_identity() {
    let remote = seeded();
    let mut sync = controller(&remote);
    sync.set_identity(Some(&alice())).await.unwrap();

    sync.teardown().await;

    assert_eq!(ScriptedStore::count(&remote.unsubscribes), 1);
    assert!(sync.identity().is_none());
    assert!(sync.store().is_empty());
}
