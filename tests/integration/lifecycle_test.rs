//! Integration tests for the session lifecycle.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use helpers::{FakeService, ids, nid, page, settle, unread};

use inboxhub_core::config::AppConfig;
use inboxhub_core::types::PageMeta;
use inboxhub_entity::{ChannelState, ConnectionState};
use inboxhub_service::PushChannel;
use inboxhub_sync::{
    FetchCoordinator, InboxEngine, LifecycleController, MemoryPushChannel, NotificationStore,
    StoreEvent,
};

struct Fixture {
    service: Arc<FakeService>,
    channel: Arc<MemoryPushChannel>,
    store: Arc<NotificationStore>,
    lifecycle: LifecycleController,
}

fn fixture() -> Fixture {
    let service = FakeService::new();
    service.set_pages(vec![page(1, 2, vec![unread(1), unread(2)])]);
    let store = helpers::store(&service);
    let channel = Arc::new(MemoryPushChannel::new());
    let lifecycle = LifecycleController::new(
        FetchCoordinator::new(store.clone(), 10),
        channel.clone(),
        Duration::from_secs(5),
    );
    Fixture {
        service,
        channel,
        store,
        lifecycle,
    }
}

#[tokio::test]
async fn test_login_connects_subscribes_and_loads() {
    let f = fixture();

    assert!(f.lifecycle.set_authenticated(true).await);

    assert!(f.lifecycle.is_active().await);
    assert!(f.lifecycle.session_id().await.is_some());
    assert_eq!(f.channel.connect_calls(), 1);
    assert!(f.channel.is_subscribed());
    assert_eq!(f.service.fetch_calls(), 1);
    assert_eq!(ids(&f.store), vec![nid(1), nid(2)]);
    assert_eq!(f.store.unread_count(), 2);
    // Connecting until the first poll tick reports otherwise.
    assert_eq!(f.store.connection_state(), ConnectionState::Connecting);
}

#[tokio::test]
async fn test_repeated_login_is_noop() {
    let f = fixture();

    assert!(f.lifecycle.set_authenticated(true).await);
    assert!(!f.lifecycle.set_authenticated(true).await);

    assert_eq!(f.channel.connect_calls(), 1);
    assert_eq!(f.channel.subscribe_calls(), 1);
    assert_eq!(f.service.fetch_calls(), 1);
}

#[tokio::test]
async fn test_logout_tears_down_and_clears_store() {
    let f = fixture();
    f.lifecycle.set_authenticated(true).await;
    f.store.report_channel_error("flaky");

    assert!(f.lifecycle.set_authenticated(false).await);

    assert!(!f.lifecycle.is_active().await);
    assert_eq!(f.channel.unsubscribe_calls(), 1);
    assert_eq!(f.channel.disconnect_calls(), 1);
    assert!(!f.channel.is_subscribed());
    assert_eq!(f.channel.state(), ChannelState::Disconnected);

    let snapshot = f.store.snapshot();
    assert!(snapshot.records.is_empty());
    assert_eq!(snapshot.unread_count, 0);
    assert_eq!(snapshot.meta, PageMeta::default());
    assert_eq!(snapshot.connection, ConnectionState::Disconnected);
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn test_repeated_logout_is_noop() {
    let f = fixture();
    f.lifecycle.set_authenticated(true).await;

    assert!(f.lifecycle.set_authenticated(false).await);
    assert!(!f.lifecycle.set_authenticated(false).await);

    assert_eq!(f.channel.disconnect_calls(), 1);
}

#[tokio::test]
async fn test_pushes_route_into_store() {
    let f = fixture();
    f.lifecycle.set_authenticated(true).await;

    assert!(f.channel.publish(unread(3)));

    assert_eq!(ids(&f.store), vec![nid(3), nid(1), nid(2)]);
    assert_eq!(f.store.unread_count(), 3);
    assert_eq!(f.store.meta().total_items, 21);
}

#[tokio::test]
async fn test_pushes_stop_after_logout() {
    let f = fixture();
    f.lifecycle.set_authenticated(true).await;
    f.lifecycle.set_authenticated(false).await;

    f.channel.set_state(ChannelState::Connected);
    assert!(!f.channel.publish(unread(3)));
    assert!(f.store.records().is_empty());
}

#[tokio::test]
async fn test_relogin_starts_fresh_session() {
    let f = fixture();
    f.lifecycle.set_authenticated(true).await;
    let first = f.lifecycle.session_id().await;
    f.channel.publish(unread(3));

    f.lifecycle.set_authenticated(false).await;
    f.lifecycle.set_authenticated(true).await;

    assert_ne!(f.lifecycle.session_id().await, first);
    assert_eq!(ids(&f.store), vec![nid(1), nid(2)]);
    assert_eq!(f.channel.connect_calls(), 2);
    assert_eq!(f.service.fetch_calls(), 2);
}

#[tokio::test]
async fn test_channel_failure_sets_error_state() {
    let f = fixture();
    f.lifecycle.set_authenticated(true).await;

    f.channel.fail("socket hang up");

    assert_eq!(f.store.connection_state(), ConnectionState::Error);
    assert_eq!(
        f.store.error_message().as_deref(),
        Some("Notification channel error: socket hang up")
    );
    assert_eq!(f.store.records().len(), 2);
}

#[tokio::test]
async fn test_refused_connect_reports_channel_error_and_still_loads() {
    let f = fixture();
    f.channel.refuse_connections(true);
    let mut events = f.store.subscribe();

    f.lifecycle.set_authenticated(true).await;

    let events = helpers::drain(&mut events);
    assert!(events.contains(&StoreEvent::ConnectionChanged(ConnectionState::Error)));
    assert!(events.contains(&StoreEvent::ErrorChanged(Some(
        "Notification channel error: push channel refused the connection".to_string()
    ))));

    // The successful first page clears the error again.
    assert_eq!(f.store.records().len(), 2);
    assert!(f.store.error_message().is_none());
    assert_eq!(f.store.connection_state(), ConnectionState::Connecting);
}

#[tokio::test]
async fn test_follow_tracks_signal_until_closed() {
    let f = fixture();
    let lifecycle = Arc::new(f.lifecycle);
    let (auth_tx, auth_rx) = watch::channel(false);

    let follower = {
        let lifecycle = lifecycle.clone();
        tokio::spawn(async move { lifecycle.follow(auth_rx).await })
    };
    settle().await;
    assert!(!lifecycle.is_active().await);

    auth_tx.send(true).unwrap();
    settle().await;
    assert!(lifecycle.is_active().await);
    assert_eq!(f.store.records().len(), 2);

    auth_tx.send(false).unwrap();
    settle().await;
    assert!(!lifecycle.is_active().await);
    assert!(f.store.records().is_empty());

    auth_tx.send(true).unwrap();
    settle().await;
    assert!(lifecycle.is_active().await);

    drop(auth_tx);
    follower.await.unwrap();
    assert!(!lifecycle.is_active().await);
    assert_eq!(f.channel.disconnect_calls(), 2);
}

#[tokio::test]
async fn test_follow_sees_logout_while_first_page_loads() {
    let f = fixture();
    let lifecycle = Arc::new(f.lifecycle);
    let (auth_tx, auth_rx) = watch::channel(true);

    f.service.hold();
    let follower = {
        let lifecycle = lifecycle.clone();
        tokio::spawn(async move { lifecycle.follow(auth_rx).await })
    };
    settle().await;
    assert!(lifecycle.is_active().await);
    assert_eq!(f.service.fetch_calls(), 1);
    assert!(f.store.is_loading());

    auth_tx.send(false).unwrap();
    settle().await;
    assert!(!lifecycle.is_active().await);
    assert!(!f.store.is_loading());
    assert_eq!(f.channel.disconnect_calls(), 1);

    // The abandoned page never lands in the store.
    f.service.release();
    settle().await;
    assert!(f.store.records().is_empty());
    assert_eq!(f.store.unread_count(), 0);

    drop(auth_tx);
    follower.await.unwrap();
    assert_eq!(f.service.fetch_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_poll_updates_connection_after_login() {
    let f = fixture();
    f.lifecycle.set_authenticated(true).await;
    assert_eq!(f.store.connection_state(), ConnectionState::Connecting);

    tokio::time::sleep(Duration::from_millis(5100)).await;
    assert_eq!(f.store.connection_state(), ConnectionState::Connected);

    f.lifecycle.set_authenticated(false).await;
    assert_eq!(f.store.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_engine_exposes_operations() {
    let service = FakeService::new();
    service.set_pages(vec![
        page(1, 2, vec![unread(1), unread(2)]),
        page(2, 2, vec![unread(3)]),
    ]);
    let channel = Arc::new(MemoryPushChannel::new());
    let engine = InboxEngine::new(&AppConfig::default(), service.clone(), channel.clone());

    engine.lifecycle.set_authenticated(true).await;
    assert!(engine.load_more().await.is_applied());
    assert!(engine.mark_one_read(&nid(2)).await);
    assert_eq!(engine.snapshot().unread_count, 2);

    assert!(engine.mark_all_read().await);
    assert_eq!(engine.snapshot().unread_count, 0);
    assert_eq!(service.mark_all_calls(), 1);

    engine.shutdown().await;
    assert!(engine.snapshot().records.is_empty());
    assert_eq!(channel.disconnect_calls(), 1);
}
