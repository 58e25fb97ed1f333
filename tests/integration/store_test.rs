//! Integration tests for the notification store's reconciliation rules.

mod helpers;

use std::sync::Arc;

use tokio::task::JoinHandle;

use helpers::{FakeService, assert_consistent, drain, ids, meta, nid, read, settle, unread};

use inboxhub_core::config::StoreConfig;
use inboxhub_core::error::{AppError, ErrorKind};
use inboxhub_entity::ConnectionState;
use inboxhub_sync::{NotificationStore, StoreEvent};

#[tokio::test]
async fn test_unread_counter_matches_recount_after_mixed_operations() {
    let service = FakeService::new();
    let store = helpers::store(&service);

    store.replace_page(vec![unread(1), read(2), unread(3)], meta(1, 2, 6));
    assert_consistent(&store);

    store.append_page(vec![unread(4), read(5), unread(6)], meta(2, 2, 6));
    assert_consistent(&store);

    store.insert_pushed(unread(7));
    store.insert_pushed(read(8));
    assert_consistent(&store);

    assert!(store.mark_one_read(&nid(3)).await);
    assert_consistent(&store);

    service.fail_mark_one(Some(AppError::remote("boom")));
    assert!(!store.mark_one_read(&nid(7)).await);
    assert_consistent(&store);

    service.fail_mark_all(Some(AppError::remote("boom")));
    assert!(!store.mark_all_read().await);
    assert_consistent(&store);

    service.fail_mark_all(None);
    assert!(store.mark_all_read().await);
    assert_consistent(&store);
    assert_eq!(store.unread_count(), 0);
}

#[tokio::test]
async fn test_mark_one_read_twice_is_idempotent() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![unread(1), unread(2)], meta(1, 1, 2));

    assert!(store.mark_one_read(&nid(1)).await);
    assert_eq!(service.mark_one_calls(), 1);

    let before = store.snapshot();
    let mut events = store.subscribe();

    assert!(store.mark_one_read(&nid(1)).await);
    assert_eq!(service.mark_one_calls(), 1);
    assert_eq!(store.snapshot(), before);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn test_mark_one_read_unknown_id_makes_no_remote_call() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![unread(1)], meta(1, 1, 1));

    assert!(store.mark_one_read(&nid(99)).await);
    assert_eq!(service.mark_one_calls(), 0);
    assert_eq!(store.unread_count(), 1);
}

#[tokio::test]
async fn test_mark_one_read_rollback_restores_record() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![unread(1), unread(2), read(3)], meta(1, 1, 3));
    assert_eq!(store.unread_count(), 2);

    service.fail_mark_one(Some(AppError::remote("not allowed")));
    service.hold();

    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.mark_one_read(&nid(2)).await })
    };
    settle().await;

    // Optimistic step is visible while the call is in flight.
    assert!(store.records()[1].read);
    assert_eq!(store.unread_count(), 1);

    service.release();
    assert!(!task.await.unwrap());

    assert!(store.records()[1].is_unread());
    assert_eq!(store.unread_count(), 2);
    let error = store.error().unwrap();
    assert_eq!(error.kind, ErrorKind::MutationRejected);
    assert_eq!(
        error.message,
        "Failed to mark notification as read: not allowed"
    );
    assert_consistent(&store);
}

#[tokio::test]
async fn test_mark_all_read_rollback_restores_exact_list() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    let original = vec![unread(1), read(2), unread(3), read(4), unread(5)];
    store.replace_page(original.clone(), meta(1, 1, 5));
    assert_eq!(store.unread_count(), 3);

    service.fail_mark_all(Some(AppError::remote("unavailable")));
    service.hold();

    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.mark_all_read().await })
    };
    settle().await;

    assert!(store.records().iter().all(|r| r.read));
    assert_eq!(store.unread_count(), 0);
    assert!(store.is_marking_all());

    service.release();
    assert!(!task.await.unwrap());

    assert_eq!(store.records(), original);
    assert_eq!(store.unread_count(), 3);
    assert!(!store.is_marking_all());
    assert_eq!(
        store.error_message().as_deref(),
        Some("Failed to mark all as read: unavailable")
    );
}

#[tokio::test]
async fn test_second_mark_all_rejected_while_outstanding() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![unread(1), unread(2)], meta(1, 1, 2));

    service.hold();
    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.mark_all_read().await })
    };
    settle().await;

    assert!(!store.mark_all_read().await);
    assert_eq!(service.mark_all_calls(), 1);

    service.release();
    assert!(first.await.unwrap());
    assert!(!store.is_marking_all());
    assert_eq!(store.unread_count(), 0);
}

#[tokio::test]
async fn test_append_keeps_source_order() {
    let service = FakeService::new();
    let store = helpers::store(&service);

    store.replace_page(vec![unread(1), read(2)], meta(1, 2, 4));
    store.append_page(vec![unread(3), unread(4)], meta(2, 2, 4));

    assert_eq!(ids(&store), vec![nid(1), nid(2), nid(3), nid(4)]);
    assert_eq!(store.unread_count(), 3);
    assert_eq!(store.meta().current_page, 2);
}

#[tokio::test]
async fn test_insert_pushed_prepends_and_counts() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![read(1), read(2)], meta(1, 1, 2));

    store.insert_pushed(unread(3));

    assert_eq!(ids(&store), vec![nid(3), nid(1), nid(2)]);
    assert_eq!(store.meta().total_items, 3);
    assert_eq!(store.unread_count(), 1);

    store.insert_pushed(read(4));
    assert_eq!(store.meta().total_items, 4);
    assert_eq!(store.unread_count(), 1);
}

#[tokio::test]
async fn test_duplicate_push_kept_and_counted_twice_by_default() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![unread(1), read(2)], meta(1, 1, 2));

    assert!(store.insert_pushed(unread(1)));

    assert_eq!(ids(&store), vec![nid(1), nid(1), nid(2)]);
    assert_eq!(store.unread_count(), 2);
    assert_eq!(store.meta().total_items, 3);
    assert_consistent(&store);
}

#[tokio::test]
async fn test_duplicate_push_dropped_when_deduping() {
    let service = FakeService::new();
    let store = helpers::store_with(
        &service,
        StoreConfig {
            dedupe_pushed: true,
            ..StoreConfig::default()
        },
    );
    store.replace_page(vec![unread(1), read(2)], meta(1, 1, 2));

    assert!(!store.insert_pushed(unread(1)));
    assert!(store.insert_pushed(unread(3)));

    assert_eq!(ids(&store), vec![nid(3), nid(1), nid(2)]);
    assert_eq!(store.unread_count(), 2);
    assert_eq!(store.meta().total_items, 3);
}

#[tokio::test]
async fn test_mark_one_rollback_targets_same_record_after_pushes() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![unread(1), unread(2)], meta(1, 1, 2));

    service.fail_mark_one(Some(AppError::remote("nope")));
    service.hold();
    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.mark_one_read(&nid(1)).await })
    };
    settle().await;

    store.insert_pushed(unread(3));
    store.insert_pushed(unread(4));

    service.release();
    assert!(!task.await.unwrap());

    assert_eq!(ids(&store), vec![nid(4), nid(3), nid(1), nid(2)]);
    assert!(store.records().iter().all(|r| r.is_unread()));
    assert_eq!(store.unread_count(), 4);
    assert_consistent(&store);
}

#[tokio::test]
async fn test_mark_all_rollback_keeps_interleaved_push() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![unread(1), read(2), unread(3)], meta(1, 1, 3));

    service.fail_mark_all(Some(AppError::remote("nope")));
    service.hold();
    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.mark_all_read().await })
    };
    settle().await;

    store.insert_pushed(unread(4));
    assert_eq!(store.unread_count(), 1);

    service.release();
    assert!(!task.await.unwrap());

    assert_eq!(ids(&store), vec![nid(4), nid(1), nid(2), nid(3)]);
    let read_flags: Vec<bool> = store.records().iter().map(|r| r.read).collect();
    assert_eq!(read_flags, vec![false, false, true, false]);
    assert_eq!(store.unread_count(), 3);
    assert_consistent(&store);
}

/// Starts a failing mark-one on record 1, then a failing mark-all, both held
/// at the remote. The list starts as `[u1, u2, r3]`.
async fn overlapping_failed_marks(
    service: &Arc<FakeService>,
) -> (Arc<NotificationStore>, JoinHandle<bool>, JoinHandle<bool>) {
    let store = helpers::store(service);
    store.replace_page(vec![unread(1), unread(2), read(3)], meta(1, 1, 3));

    service.fail_mark_one(Some(AppError::remote("nope")));
    service.fail_mark_all(Some(AppError::remote("nope")));
    service.hold_mark_one();
    service.hold_mark_all();

    let mark_one = {
        let store = store.clone();
        tokio::spawn(async move { store.mark_one_read(&nid(1)).await })
    };
    settle().await;
    let mark_all = {
        let store = store.clone();
        tokio::spawn(async move { store.mark_all_read().await })
    };
    settle().await;

    assert_eq!(store.unread_count(), 0);
    assert!(store.is_marking_all());
    (store, mark_one, mark_all)
}

#[tokio::test]
async fn test_mark_one_and_mark_all_both_fail_mark_one_first() {
    let service = FakeService::new();
    let (store, mark_one, mark_all) = overlapping_failed_marks(&service).await;

    service.release_mark_one();
    assert!(!mark_one.await.unwrap());
    assert_consistent(&store);

    service.release_mark_all();
    assert!(!mark_all.await.unwrap());

    let read_flags: Vec<bool> = store.records().iter().map(|r| r.read).collect();
    assert_eq!(read_flags, vec![false, false, true]);
    assert_eq!(store.unread_count(), 2);
    assert!(!store.is_marking_all());
    assert_consistent(&store);
}

#[tokio::test]
async fn test_mark_one_and_mark_all_both_fail_mark_all_first() {
    let service = FakeService::new();
    let (store, mark_one, mark_all) = overlapping_failed_marks(&service).await;

    service.release_mark_all();
    assert!(!mark_all.await.unwrap());
    assert_consistent(&store);

    service.release_mark_one();
    assert!(!mark_one.await.unwrap());

    let read_flags: Vec<bool> = store.records().iter().map(|r| r.read).collect();
    assert_eq!(read_flags, vec![false, false, true]);
    assert_eq!(store.unread_count(), 2);
    assert!(!store.is_marking_all());
    assert_consistent(&store);
}

#[tokio::test]
async fn test_mark_all_rollback_keeps_pushed_record_marked_read() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![unread(1), read(2)], meta(1, 1, 2));

    service.fail_mark_all(Some(AppError::remote("nope")));
    service.hold_mark_all();
    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.mark_all_read().await })
    };
    settle().await;

    store.insert_pushed(unread(3));
    assert!(store.mark_one_read(&nid(3)).await);
    assert_eq!(store.unread_count(), 0);

    service.release_mark_all();
    assert!(!task.await.unwrap());

    assert_eq!(ids(&store), vec![nid(3), nid(1), nid(2)]);
    let read_flags: Vec<bool> = store.records().iter().map(|r| r.read).collect();
    assert_eq!(read_flags, vec![true, false, true]);
    assert_eq!(store.unread_count(), 1);
    assert_consistent(&store);
}

#[tokio::test]
async fn test_mark_all_rollback_after_append() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![unread(1), read(2)], meta(1, 2, 4));

    service.fail_mark_all(Some(AppError::remote("nope")));
    service.hold_mark_all();
    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.mark_all_read().await })
    };
    settle().await;

    store.append_page(vec![unread(3), read(4)], meta(2, 2, 4));
    assert_eq!(store.unread_count(), 1);

    service.release_mark_all();
    assert!(!task.await.unwrap());

    assert_eq!(ids(&store), vec![nid(1), nid(2), nid(3), nid(4)]);
    let read_flags: Vec<bool> = store.records().iter().map(|r| r.read).collect();
    assert_eq!(read_flags, vec![false, true, false, true]);
    assert_eq!(store.unread_count(), 2);
    assert_consistent(&store);
}

#[tokio::test]
async fn test_mark_one_rollback_skipped_after_refresh() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![unread(1)], meta(1, 1, 1));

    service.fail_mark_one(Some(AppError::remote("nope")));
    service.hold();
    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.mark_one_read(&nid(1)).await })
    };
    settle().await;

    // A newer fetched truth replaces the list before the failure lands.
    store.replace_page(vec![read(1)], meta(1, 1, 1));

    service.release();
    assert!(!task.await.unwrap());

    assert!(store.records()[0].read);
    assert_eq!(store.unread_count(), 0);
    assert!(store.error_message().is_some());
}

#[tokio::test]
async fn test_successful_mark_clears_error_and_connection_error() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![unread(1)], meta(1, 1, 1));
    store.set_connection_state(ConnectionState::Connected);
    store.report_channel_error("socket closed");

    assert_eq!(store.connection_state(), ConnectionState::Error);
    assert_eq!(
        store.error_message().as_deref(),
        Some("Notification channel error: socket closed")
    );

    assert!(store.mark_one_read(&nid(1)).await);

    assert!(store.error_message().is_none());
    assert_eq!(store.connection_state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_acknowledge_error_clears_slot_once() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.report_channel_error("lost");

    let mut events = store.subscribe();
    assert!(store.acknowledge_error());
    assert!(!store.acknowledge_error());

    assert_eq!(drain(&mut events), vec![StoreEvent::ErrorChanged(None)]);
}

#[tokio::test]
async fn test_push_from_previous_session_is_ignored() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    let old_epoch = store.epoch();

    store.reset();

    assert!(!store.insert_pushed_if_current(old_epoch, unread(1)));
    store.report_channel_error_if_current(old_epoch, "late failure");
    assert!(store.records().is_empty());
    assert!(store.error_message().is_none());

    assert!(store.insert_pushed_if_current(store.epoch(), unread(2)));
    assert_eq!(store.unread_count(), 1);
}

#[tokio::test]
async fn test_reset_during_mark_all_discards_late_failure() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    store.replace_page(vec![unread(1), unread(2)], meta(1, 1, 2));

    service.fail_mark_all(Some(AppError::remote("nope")));
    service.hold();
    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.mark_all_read().await })
    };
    settle().await;

    store.reset();
    service.release();
    assert!(!task.await.unwrap());

    let snapshot = store.snapshot();
    assert!(snapshot.records.is_empty());
    assert_eq!(snapshot.unread_count, 0);
    assert!(snapshot.error.is_none());
    assert!(!snapshot.marking_all);
}

#[tokio::test]
async fn test_events_describe_changes() {
    let service = FakeService::new();
    let store = helpers::store(&service);
    let mut events = store.subscribe();

    store.replace_page(vec![unread(1), read(2)], meta(1, 2, 4));
    store.append_page(vec![unread(3)], meta(2, 2, 4));
    store.insert_pushed(unread(4));

    assert_eq!(
        drain(&mut events),
        vec![
            StoreEvent::Replaced { count: 2, unread: 1 },
            StoreEvent::Appended {
                page: 2,
                count: 1,
                unread: 2
            },
            StoreEvent::Pushed {
                id: nid(4),
                unread: 3
            },
        ]
    );
}
