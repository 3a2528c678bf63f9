//! Tests for subscribers and the group registry

use super::*;

fn frame(text: &str) -> Arc<str> {
    Arc::from(text)
}

// ============================================================================
// Subscriber tests
// ============================================================================

#[tokio::test]
async fn test_unique_ids() {
    let (a, _rx_a) = Subscriber::channel(4);
    let (b, _rx_b) = Subscriber::channel(4);

    assert!(a.id() > 0);
    assert_ne!(a.id(), b.id());
}

#[tokio::test]
async fn test_emit_delivers_in_order() {
    let (subscriber, mut rx) = Subscriber::channel(4);

    subscriber.emit(frame("one")).unwrap();
    subscriber.emit(frame("two")).unwrap();

    assert_eq!(&*rx.recv().await.unwrap(), "one");
    assert_eq!(&*rx.recv().await.unwrap(), "two");
}

#[tokio::test]
async fn test_emit_full_buffer_is_lagging() {
    let (subscriber, mut rx) = Subscriber::channel(1);

    subscriber.emit(frame("one")).unwrap();
    let err = subscriber.emit(frame("two")).unwrap_err();
    assert!(matches!(err, TapError::Lagging { id } if id == subscriber.id()));

    // The subscriber recovers once its queue drains
    assert_eq!(&*rx.recv().await.unwrap(), "one");
    subscriber.emit(frame("three")).unwrap();
}

#[tokio::test]
async fn test_emit_after_disconnect_is_closed() {
    let (subscriber, rx) = Subscriber::channel(4);
    drop(rx);
    assert!(matches!(
        subscriber.emit(frame("late")),
        Err(TapError::ChannelClosed { .. })
    ));
}

// ============================================================================
// Registry tests
// ============================================================================

#[tokio::test]
async fn test_join_registers_subscriber() {
    let registry = SubscriberRegistry::new();
    let (subscriber, _rx) = Subscriber::channel(4);

    assert!(registry.join(&subscriber, "global"));

    assert!(registry.contains(subscriber.id()));
    assert_eq!(registry.count(), 1);
    assert_eq!(registry.group_size("global"), 1);
}

#[tokio::test]
async fn test_join_is_idempotent() {
    let registry = SubscriberRegistry::new();
    let (subscriber, _rx) = Subscriber::channel(4);

    assert!(registry.join(&subscriber, "global"));
    assert!(!registry.join(&subscriber, "global"));

    assert_eq!(registry.count(), 1);
    assert_eq!(registry.members_of("global").len(), 1);
}

#[tokio::test]
async fn test_leave_removes_from_every_group() {
    let registry = SubscriberRegistry::new();
    let (a, _rx_a) = Subscriber::channel(4);
    let (b, _rx_b) = Subscriber::channel(4);

    registry.join(&a, "global");
    registry.join(&a, "rust");
    registry.join(&b, "global");
    assert_eq!(registry.groups_of(a.id()), vec!["global", "rust"]);

    assert!(registry.leave(a.id()));

    assert!(!registry.contains(a.id()));
    assert!(registry.groups_of(a.id()).is_empty());
    assert_eq!(registry.group_size("rust"), 0);
    let members: Vec<u64> = registry.members_of("global").iter().map(|s| s.id()).collect();
    assert_eq!(members, vec![b.id()]);
}

#[tokio::test]
async fn test_leave_is_idempotent() {
    let registry = SubscriberRegistry::new();
    let (subscriber, _rx) = Subscriber::channel(4);
    registry.join(&subscriber, "global");

    assert!(registry.leave(subscriber.id()));
    assert!(!registry.leave(subscriber.id()));
    assert!(!registry.leave(999_999));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_leave_group_keeps_connection() {
    let registry = SubscriberRegistry::new();
    let (subscriber, _rx) = Subscriber::channel(4);
    registry.join(&subscriber, "global");
    registry.join(&subscriber, "rust");

    assert!(registry.leave_group(subscriber.id(), "rust"));
    assert!(!registry.leave_group(subscriber.id(), "rust"));
    assert!(!registry.leave_group(subscriber.id(), "missing"));

    assert!(registry.contains(subscriber.id()));
    assert_eq!(registry.groups_of(subscriber.id()), vec!["global"]);
}

#[tokio::test]
async fn test_members_of_unknown_group_is_empty() {
    let registry = SubscriberRegistry::new();
    assert!(registry.members_of("nobody").is_empty());
    assert_eq!(registry.group_size("nobody"), 0);
}

#[tokio::test]
async fn test_snapshot_unaffected_by_later_leave() {
    let registry = SubscriberRegistry::new();
    let (a, mut rx_a) = Subscriber::channel(4);
    registry.join(&a, "global");

    let snapshot = registry.members_of("global");
    registry.leave(a.id());

    // A pass already in flight still holds the subscriber
    for member in &snapshot {
        member.emit(frame("in flight")).unwrap();
    }
    assert_eq!(&*rx_a.recv().await.unwrap(), "in flight");
    assert!(registry.members_of("global").is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_join_leave_and_iteration() {
    let registry = Arc::new(SubscriberRegistry::new());
    let mut tasks = Vec::new();

    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            for _ in 0..200 {
                let (subscriber, _rx) = Subscriber::channel(1);
                registry.join(&subscriber, "global");
                assert!(registry.contains(subscriber.id()));
                let _ = registry.members_of("global");
                assert!(registry.leave(subscriber.id()));
                assert!(!registry.contains(subscriber.id()));
                tokio::task::yield_now().await;
            }
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }

    assert!(registry.is_empty());
    assert_eq!(registry.group_size("global"), 0);
}
